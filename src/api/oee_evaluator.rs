// ==========================================
// MES 后端 - OEE 评估
// ==========================================
// 职责: 组装评估窗口 → 读取停机区间 → 汇总停机 → 计算 OEE
// 说明: 计算本身在 engine 层（纯函数），此处只负责取数
// ==========================================

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::error::ApiResult;
use crate::config::config_manager::ConfigManager;
use crate::domain::machine::Machine;
use crate::domain::shift::Shift;
use crate::domain::stop::StopInterval;
use crate::domain::types::DowntimeWindowPolicy;
use crate::engine::{compute_downtime_with_policy, compute_oee, OeeResult, ShiftWindow};
use crate::repository::stop_repo::StopRepository;

/// 一次评估的上下文（窗口 + 计划时长 + 停机口径）
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EvaluationContext {
    pub window: ShiftWindow,
    pub planned_time: f64,
    pub downtime_policy: DowntimeWindowPolicy,
}

pub struct OeeEvaluator {
    stop_repo: Arc<StopRepository>,
    config_manager: Arc<ConfigManager>,
}

impl OeeEvaluator {
    pub fn new(stop_repo: Arc<StopRepository>, config_manager: Arc<ConfigManager>) -> Self {
        Self {
            stop_repo,
            config_manager,
        }
    }

    /// 默认上下文：以 now 为终点的滚动窗口，计划时长取配置
    pub fn default_context(&self, now: DateTime<Utc>) -> ApiResult<EvaluationContext> {
        let settings = self.config_manager.get_oee_settings()?;
        Ok(EvaluationContext {
            window: ShiftWindow::trailing(now, settings.window_hours),
            planned_time: settings.planned_time_secs,
            downtime_policy: settings.downtime_policy,
        })
    }

    /// 班次上下文：计划时长为该班次截至 now 已经过的排班时长
    pub fn shift_context(&self, shift: &Shift, now: DateTime<Utc>) -> ApiResult<EvaluationContext> {
        let settings = self.config_manager.get_oee_settings()?;
        let window = ShiftWindow::for_shift(shift, now);
        Ok(EvaluationContext {
            window,
            planned_time: window.length_secs(),
            downtime_policy: settings.downtime_policy,
        })
    }

    /// 评估单台设备
    pub fn evaluate_machine(
        &self,
        machine: &Machine,
        ctx: &EvaluationContext,
    ) -> ApiResult<OeeResult> {
        let intervals: Vec<StopInterval> = self
            .load_intervals(Some(machine.id), ctx)?
            .into_iter()
            .map(|(_, interval)| interval)
            .collect();
        Ok(Self::compute(machine, &intervals, ctx))
    }

    /// 批量评估（一次查询取全部设备的停机区间）
    ///
    /// # 返回
    /// 与 machines 顺序一致的结果列表
    pub fn evaluate_machines(
        &self,
        machines: &[Machine],
        ctx: &EvaluationContext,
    ) -> ApiResult<Vec<OeeResult>> {
        let mut by_machine: HashMap<i64, Vec<StopInterval>> = HashMap::new();
        for (machine_id, interval) in self.load_intervals(None, ctx)? {
            by_machine.entry(machine_id).or_default().push(interval);
        }

        Ok(machines
            .iter()
            .map(|machine| {
                let intervals = by_machine
                    .get(&machine.id)
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);
                Self::compute(machine, intervals, ctx)
            })
            .collect())
    }

    fn load_intervals(
        &self,
        machine_id: Option<i64>,
        ctx: &EvaluationContext,
    ) -> ApiResult<Vec<(i64, StopInterval)>> {
        let intervals = match ctx.downtime_policy {
            DowntimeWindowPolicy::StartedInWindow => self
                .stop_repo
                .list_intervals_started_since(machine_id, ctx.window.start)?,
            DowntimeWindowPolicy::OverlapsWindow => self.stop_repo.list_intervals_overlapping(
                machine_id,
                ctx.window.start,
                ctx.window.end,
            )?,
        };
        Ok(intervals)
    }

    fn compute(machine: &Machine, intervals: &[StopInterval], ctx: &EvaluationContext) -> OeeResult {
        let downtime = compute_downtime_with_policy(intervals, &ctx.window, ctx.downtime_policy);
        tracing::debug!(machine_id = machine.id, downtime, "停机汇总");
        compute_oee(
            ctx.planned_time,
            downtime,
            machine.counter_type,
            machine.effective_rate(),
        )
    }
}
