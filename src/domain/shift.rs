// ==========================================
// MES 后端 - 班次实体
// ==========================================

use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};

/// 班次
///
/// start_time / end_time 为一天中的时刻；end_time <= start_time 表示跨午夜
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shift {
    pub id: i64,
    pub line_id: Option<i64>,
    pub name: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub shift_quantity: i64,
    pub operator: Option<String>,
    pub duration: Option<f64>,
}

impl Shift {
    /// 班次计划时长
    pub fn length(&self) -> Duration {
        let raw = self.end_time - self.start_time;
        if raw <= Duration::zero() {
            raw + Duration::hours(24)
        } else {
            raw
        }
    }
}

/// 解析班次时刻（HH:MM 或 HH:MM:SS）
pub fn parse_time_of_day(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .ok()
}
