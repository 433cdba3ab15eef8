// ==========================================
// MES 后端 - 报警与设备事件
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 设备报警
///
/// cleared_at 为空表示报警未消除
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alarm {
    pub id: i64,
    pub machine_id: i64,
    pub code: String,
    pub description: Option<String>,
    pub occurred_at: DateTime<Utc>,
    pub cleared_at: Option<DateTime<Utc>>,
}

/// 设备事件（换型、开机、工单切换等）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineEvent {
    pub id: i64,
    pub machine_id: i64,
    pub work_order_id: Option<i64>,
    pub event_type: String,
    pub description: Option<String>,
    pub occurred_at: DateTime<Utc>,
}
