// ==========================================
// MES 后端 - 设备管理 API
// ==========================================
// 职责: 设备 CRUD + 读取时附带实时 OEE
// ==========================================

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::api::input::{lenient_f64, non_empty_string, require_status, require_text};
use crate::api::oee_evaluator::{EvaluationContext, OeeEvaluator};
use crate::domain::machine::Machine;
use crate::domain::types::{CounterType, DowntimeWindowPolicy};
use crate::engine::{OeeResult, ShiftWindow};
use crate::repository::error::RepositoryError;
use crate::repository::machine_repo::{MachineDraft, MachineRepository};
use crate::repository::shift_repo::ShiftRepository;

// ==========================================
// MachineApi - 设备管理 API
// ==========================================

/// 设备管理API
///
/// 职责：
/// 1. 设备查询（列表、详情），附带 OEE 四项指标
/// 2. 单台设备 OEE 报告（默认窗口或指定班次）
/// 3. 设备新增、修改、删除
pub struct MachineApi {
    machine_repo: Arc<MachineRepository>,
    shift_repo: Arc<ShiftRepository>,
    evaluator: Arc<OeeEvaluator>,
}

impl MachineApi {
    pub fn new(
        machine_repo: Arc<MachineRepository>,
        shift_repo: Arc<ShiftRepository>,
        evaluator: Arc<OeeEvaluator>,
    ) -> Self {
        Self {
            machine_repo,
            shift_repo,
            evaluator,
        }
    }

    /// 查询全部设备（以当前时刻评估 OEE）
    pub fn list_machines(&self) -> ApiResult<Vec<MachineView>> {
        self.list_machines_at(Utc::now())
    }

    /// 查询全部设备（以指定时刻评估 OEE）
    pub fn list_machines_at(&self, now: DateTime<Utc>) -> ApiResult<Vec<MachineView>> {
        let machines = self.machine_repo.list_all()?;
        let ctx = self.evaluator.default_context(now)?;
        let results = self.evaluator.evaluate_machines(&machines, &ctx)?;

        Ok(machines
            .into_iter()
            .zip(results.iter())
            .map(|(machine, oee)| MachineView::new(machine, oee))
            .collect())
    }

    /// 查询设备详情
    ///
    /// # 返回
    /// - Ok(MachineView): 设备 + OEE 指标
    /// - Err(ApiError::NotFound): 设备不存在
    pub fn get_machine(&self, machine_id: i64) -> ApiResult<MachineView> {
        self.get_machine_at(machine_id, Utc::now())
    }

    pub fn get_machine_at(&self, machine_id: i64, now: DateTime<Utc>) -> ApiResult<MachineView> {
        let machine = self.find_machine(machine_id)?;
        let ctx = self.evaluator.default_context(now)?;
        let oee = self.evaluator.evaluate_machine(&machine, &ctx)?;
        Ok(MachineView::new(machine, &oee))
    }

    /// 单台设备 OEE 报告
    ///
    /// # 参数
    /// - machine_id: 设备ID
    /// - shift_id: 指定班次时按班次窗口评估，否则按默认滚动窗口
    pub fn get_machine_oee(&self, machine_id: i64, shift_id: Option<i64>) -> ApiResult<OeeReport> {
        self.get_machine_oee_at(machine_id, shift_id, Utc::now())
    }

    pub fn get_machine_oee_at(
        &self,
        machine_id: i64,
        shift_id: Option<i64>,
        now: DateTime<Utc>,
    ) -> ApiResult<OeeReport> {
        let machine = self.find_machine(machine_id)?;
        let ctx = match shift_id {
            Some(id) => {
                let shift = self
                    .shift_repo
                    .find_by_id(id)?
                    .ok_or_else(|| ApiError::from(RepositoryError::not_found("Shift", id)))?;
                self.evaluator.shift_context(&shift, now)?
            }
            None => self.evaluator.default_context(now)?,
        };
        let result = self.evaluator.evaluate_machine(&machine, &ctx)?;
        Ok(OeeReport::new(machine.id, shift_id, &ctx, result))
    }

    /// 新增设备，返回设备ID
    pub fn create_machine(&self, input: MachineInput) -> ApiResult<i64> {
        let draft = input.into_draft()?;
        let id = self.machine_repo.insert(&draft)?;
        tracing::info!(machine_id = id, name = %draft.name, "设备已创建");
        Ok(id)
    }

    /// 整体更新设备
    pub fn update_machine(&self, machine_id: i64, input: MachineInput) -> ApiResult<()> {
        let draft = input.into_draft()?;
        if self.machine_repo.update(machine_id, &draft)? == 0 {
            return Err(RepositoryError::not_found("Machine", machine_id).into());
        }
        Ok(())
    }

    pub fn delete_machine(&self, machine_id: i64) -> ApiResult<()> {
        if self.machine_repo.delete(machine_id)? == 0 {
            return Err(RepositoryError::not_found("Machine", machine_id).into());
        }
        tracing::info!(machine_id, "设备已删除");
        Ok(())
    }

    fn find_machine(&self, machine_id: i64) -> ApiResult<Machine> {
        self.machine_repo
            .find_by_id(machine_id)?
            .ok_or_else(|| RepositoryError::not_found("Machine", machine_id).into())
    }
}

// ==========================================
// DTO 类型定义
// ==========================================

/// 设备新增/修改请求
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MachineInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub line_id: Option<i64>,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub status: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "non_empty_string")]
    pub machine_type: Option<String>,
    #[serde(default)]
    pub counter_type: CounterType,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub avg_pieces_per_sec: Option<f64>,
    #[serde(default, rename = "productId", alias = "product_id")]
    pub product_id: Option<i64>,
}

impl MachineInput {
    fn into_draft(self) -> ApiResult<MachineDraft> {
        let name = require_text("name", &self.name)?;
        let status = require_status(self.status.as_deref())?;
        if let Some(rate) = self.avg_pieces_per_sec {
            if !rate.is_finite() || rate < 0.0 {
                return Err(ApiError::InvalidInput(format!(
                    "avg_pieces_per_sec must be >= 0: {}",
                    rate
                )));
            }
        }
        Ok(MachineDraft {
            name,
            line_id: self.line_id,
            status,
            machine_type: self.machine_type,
            counter_type: self.counter_type,
            avg_pieces_per_sec: self.avg_pieces_per_sec,
            product_id: self.product_id,
        })
    }
}

/// 设备 + OEE 指标（百分比）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MachineView {
    #[serde(flatten)]
    pub machine: Machine,
    pub oee: f64,
    pub availability: f64,
    pub performance: f64,
    pub quality: f64,
}

impl MachineView {
    fn new(machine: Machine, result: &OeeResult) -> Self {
        Self {
            machine,
            oee: result.oee,
            availability: result.availability,
            performance: result.performance,
            quality: result.quality,
        }
    }
}

/// OEE 报告（含全部中间量）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OeeReport {
    pub machine_id: i64,
    pub shift_id: Option<i64>,
    pub window: ShiftWindow,
    pub downtime_policy: DowntimeWindowPolicy,
    #[serde(flatten)]
    pub result: OeeResult,
}

impl OeeReport {
    fn new(
        machine_id: i64,
        shift_id: Option<i64>,
        ctx: &EvaluationContext,
        result: OeeResult,
    ) -> Self {
        Self {
            machine_id,
            shift_id,
            window: ctx.window,
            downtime_policy: ctx.downtime_policy,
            result,
        }
    }
}
