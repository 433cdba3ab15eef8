// ==========================================
// MES 后端 - 工单管理 API
// ==========================================
// 规则:
// 1. progress ∈ [0, 1]
// 2. 已完成（Completed）的工单不可回退到其他状态
// ==========================================

use std::sync::Arc;

use serde::Deserialize;

use crate::api::error::{ApiError, ApiResult};
use crate::api::input::{non_empty_string, optional_date, require_text};
use crate::domain::work_order::WorkOrder;
use crate::repository::error::RepositoryError;
use crate::repository::work_order_repo::{WorkOrderDraft, WorkOrderRepository, WorkOrderUpdate};

pub struct WorkOrderApi {
    work_order_repo: Arc<WorkOrderRepository>,
}

impl WorkOrderApi {
    pub fn new(work_order_repo: Arc<WorkOrderRepository>) -> Self {
        Self { work_order_repo }
    }

    pub fn list_work_orders(&self) -> ApiResult<Vec<WorkOrder>> {
        Ok(self.work_order_repo.list_all()?)
    }

    pub fn get_work_order(&self, order_id: i64) -> ApiResult<WorkOrder> {
        self.work_order_repo
            .find_by_id(order_id)?
            .ok_or_else(|| RepositoryError::not_found("WorkOrder", order_id).into())
    }

    pub fn create_work_order(&self, input: WorkOrderInput) -> ApiResult<i64> {
        let draft = input.into_draft()?;
        let id = self.work_order_repo.insert(&draft)?;
        tracing::info!(order_id = id, product_id = draft.product_id, status = %draft.status, "工单已创建");
        Ok(id)
    }

    /// 整体更新工单
    ///
    /// # 返回
    /// - Err(ApiError::NotFound): 工单不存在
    /// - Err(ApiError::InvalidStateTransition): 试图回退已完成的工单
    pub fn update_work_order(&self, order_id: i64, input: WorkOrderInput) -> ApiResult<()> {
        let draft = input.into_draft()?;
        match self.work_order_repo.update_unless_completed(order_id, &draft)? {
            WorkOrderUpdate::Updated => Ok(()),
            WorkOrderUpdate::NotFound => Err(RepositoryError::not_found("WorkOrder", order_id).into()),
            WorkOrderUpdate::Rejected { current_status } => {
                tracing::warn!(order_id, from = %current_status, to = %draft.status, "拒绝工单状态回退");
                Err(ApiError::InvalidStateTransition {
                    from: current_status,
                    to: draft.status,
                })
            }
        }
    }

    pub fn delete_work_order(&self, order_id: i64) -> ApiResult<()> {
        if self.work_order_repo.delete(order_id)? == 0 {
            return Err(RepositoryError::not_found("WorkOrder", order_id).into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkOrderInput {
    #[serde(default)]
    pub product_id: Option<i64>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub status: String,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub due_date: Option<String>,
    #[serde(default)]
    pub assigned_line_id: Option<i64>,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub alarms: i64,
}

impl WorkOrderInput {
    fn into_draft(self) -> ApiResult<WorkOrderDraft> {
        let product_id = self
            .product_id
            .ok_or_else(|| ApiError::InvalidInput("product_id is required".to_string()))?;
        let quantity = self
            .quantity
            .ok_or_else(|| ApiError::InvalidInput("quantity is required".to_string()))?;
        if !(0.0..=1.0).contains(&self.progress) {
            return Err(ApiError::InvalidInput(format!(
                "progress must be between 0 and 1: {}",
                self.progress
            )));
        }
        Ok(WorkOrderDraft {
            product_id,
            quantity,
            status: require_text("status", &self.status)?,
            due_date: optional_date("due_date", self.due_date.as_deref())?,
            assigned_line_id: self.assigned_line_id,
            progress: self.progress,
            alarms: self.alarms,
        })
    }
}
