// ==========================================
// MES 后端 - 班次评估窗口
// ==========================================
// 职责: 给出停机汇总与 OEE 计算所用的时间窗口
// 说明: 窗口为派生值，不落库
// ==========================================

use crate::domain::shift::Shift;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// 评估窗口 [start, end]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ShiftWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// 以 now 为终点、向前回溯 hours 小时的窗口
    ///
    /// 回溯超出时间可表示范围时，起点取可表示的最早时刻
    pub fn trailing(now: DateTime<Utc>, hours: i64) -> Self {
        let start = Duration::try_hours(hours)
            .and_then(|back| now.checked_sub_signed(back))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        Self { start, end: now }
    }

    /// 班次记录在 now 之前最近一次开班对应的窗口
    ///
    /// - 开班时刻晚于 now 时取前一天的班次
    /// - 窗口终点为 min(下班时刻, now)
    pub fn for_shift(shift: &Shift, now: DateTime<Utc>) -> Self {
        let today_start = now.date_naive().and_time(shift.start_time).and_utc();
        let start = if today_start > now {
            today_start - Duration::days(1)
        } else {
            today_start
        };
        let scheduled_end = start + shift.length();
        Self {
            start,
            end: scheduled_end.min(now),
        }
    }

    /// 窗口长度（秒），不为负
    pub fn length_secs(&self) -> f64 {
        let secs = (self.end - self.start).num_milliseconds() as f64 / 1000.0;
        secs.max(0.0)
    }
}
