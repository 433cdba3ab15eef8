// ==========================================
// MES 后端 - 停机记录
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 停机记录
///
/// end_time 为空表示停机仍在进行，计算时截断到评估时刻
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub id: i64,
    pub machine_id: i64,
    pub reason: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub resolved: bool,
}

/// 停机区间（停机汇总的最小输入）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopInterval {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
}

impl StopInterval {
    pub fn new(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }
}
