// ==========================================
// MES 后端 - 产线管理 API
// ==========================================
// 职责: 产线 CRUD + 列表汇总（设备数、告警数、派生状态、产线 OEE）
//       + 详情（最新批次、最近生产履历）
// ==========================================

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::api::input::{non_empty_string, require_status, require_text};
use crate::api::oee_evaluator::OeeEvaluator;
use crate::domain::production_line::{Batch, ProductionHistoryEntry, ProductionLine};
use crate::domain::types::MachineStatus;
use crate::engine::{average_oee, derive_line_status};
use crate::repository::error::RepositoryError;
use crate::repository::machine_repo::MachineRepository;
use crate::repository::production_line_repo::{ProductionLineDraft, ProductionLineRepository};

/// 详情页展示的生产履历条数
pub const HISTORY_LIMIT: usize = 10;

/// 尚无生产记录时的占位值
const NO_PRODUCTION: &str = "-";

// ==========================================
// ProductionLineApi - 产线管理 API
// ==========================================
pub struct ProductionLineApi {
    line_repo: Arc<ProductionLineRepository>,
    machine_repo: Arc<MachineRepository>,
    evaluator: Arc<OeeEvaluator>,
}

impl ProductionLineApi {
    pub fn new(
        line_repo: Arc<ProductionLineRepository>,
        machine_repo: Arc<MachineRepository>,
        evaluator: Arc<OeeEvaluator>,
    ) -> Self {
        Self {
            line_repo,
            machine_repo,
            evaluator,
        }
    }

    pub fn list_lines(&self) -> ApiResult<Vec<ProductionLineSummary>> {
        self.list_lines_at(Utc::now())
    }

    /// 产线列表
    ///
    /// 产线状态由下属设备推导（任一设备 RUNNING 即 RUNNING），
    /// 产线 OEE 为下属设备 OEE 的平均值。
    /// 全部设备只评估一次，再按产线分组。
    pub fn list_lines_at(&self, now: DateTime<Utc>) -> ApiResult<Vec<ProductionLineSummary>> {
        let lines = self.line_repo.list_all()?;
        let ctx = self.evaluator.default_context(now)?;

        let machines = self.machine_repo.list_all()?;
        let results = self.evaluator.evaluate_machines(&machines, &ctx)?;
        let mut by_line: HashMap<i64, Vec<(MachineStatus, f64)>> = HashMap::new();
        for (machine, result) in machines.iter().zip(&results) {
            if let Some(line_id) = machine.line_id {
                by_line
                    .entry(line_id)
                    .or_default()
                    .push((machine.status, result.oee));
            }
        }
        let alarm_counts = self.line_repo.count_alarms_by_line()?;

        let mut summaries = Vec::with_capacity(lines.len());
        for line in lines {
            let members = by_line.remove(&line.id).unwrap_or_default();
            let oees: Vec<f64> = members.iter().map(|(_, oee)| *oee).collect();
            let last_production = self
                .line_repo
                .list_history(line.id, 1)?
                .into_iter()
                .next()
                .map(|h| h.label)
                .unwrap_or_else(|| NO_PRODUCTION.to_string());

            summaries.push(ProductionLineSummary {
                id: line.id,
                name: line.name,
                description: line.description,
                status: derive_line_status(members.iter().map(|(status, _)| *status)),
                shift_quantity: line.shift_quantity,
                created_at: line.created_at,
                oee: average_oee(&oees),
                machines: members.len() as i64,
                alarms: alarm_counts.get(&line.id).copied().unwrap_or(0),
                last_production,
            });
        }
        Ok(summaries)
    }

    /// 产线详情（含最新批次与最近 HISTORY_LIMIT 条履历）
    pub fn get_line(&self, line_id: i64) -> ApiResult<ProductionLineDetail> {
        self.get_line_at(line_id, Utc::now())
    }

    /// 只按本产线设备逐台读取停机区间
    pub fn get_line_at(&self, line_id: i64, now: DateTime<Utc>) -> ApiResult<ProductionLineDetail> {
        let line = self
            .line_repo
            .find_by_id(line_id)?
            .ok_or_else(|| ApiError::from(RepositoryError::not_found("ProductionLine", line_id)))?;

        let machines = self.machine_repo.list_by_line(line_id)?;
        let ctx = self.evaluator.default_context(now)?;
        let oees = machines
            .iter()
            .map(|machine| self.evaluator.evaluate_machine(machine, &ctx).map(|r| r.oee))
            .collect::<ApiResult<Vec<f64>>>()?;

        Ok(ProductionLineDetail {
            oee: average_oee(&oees),
            batch: self.line_repo.find_latest_batch(line_id)?,
            history: self.line_repo.list_history(line_id, HISTORY_LIMIT)?,
            line,
        })
    }

    pub fn create_line(&self, input: ProductionLineInput) -> ApiResult<i64> {
        let draft = input.into_draft()?;
        let id = self.line_repo.insert(&draft)?;
        tracing::info!(line_id = id, name = %draft.name, "产线已创建");
        Ok(id)
    }

    pub fn update_line(&self, line_id: i64, input: ProductionLineInput) -> ApiResult<()> {
        let draft = input.into_draft()?;
        if self.line_repo.update(line_id, &draft)? == 0 {
            return Err(RepositoryError::not_found("ProductionLine", line_id).into());
        }
        Ok(())
    }

    pub fn delete_line(&self, line_id: i64) -> ApiResult<()> {
        if self.line_repo.delete(line_id)? == 0 {
            return Err(RepositoryError::not_found("ProductionLine", line_id).into());
        }
        tracing::info!(line_id, "产线已删除");
        Ok(())
    }
}

// ==========================================
// DTO 类型定义
// ==========================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductionLineInput {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub status: Option<String>,
    #[serde(default)]
    pub shift_quantity: i64,
}

impl ProductionLineInput {
    fn into_draft(self) -> ApiResult<ProductionLineDraft> {
        let name = require_text("name", &self.name)?;
        let status = require_status(self.status.as_deref())?;
        if self.shift_quantity < 0 {
            return Err(ApiError::InvalidInput(
                "shift_quantity must be >= 0".to_string(),
            ));
        }
        Ok(ProductionLineDraft {
            name,
            description: self.description,
            status,
            shift_quantity: self.shift_quantity,
        })
    }
}

/// 产线列表项
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductionLineSummary {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub status: MachineStatus,
    pub shift_quantity: i64,
    pub created_at: DateTime<Utc>,
    pub oee: f64,
    /// 下属设备数
    pub machines: i64,
    /// 下属设备告警数
    pub alarms: i64,
    #[serde(rename = "lastProduction")]
    pub last_production: String,
}

/// 产线详情
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductionLineDetail {
    #[serde(flatten)]
    pub line: ProductionLine,
    pub oee: f64,
    pub batch: Option<Batch>,
    pub history: Vec<ProductionHistoryEntry>,
}
