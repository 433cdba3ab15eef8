// ==========================================
// MES 后端 - 设备实体
// ==========================================

use crate::domain::types::{CounterType, MachineStatus};
use serde::{Deserialize, Serialize};

/// 设备
///
/// avg_pieces_per_sec 仅对计数型设备有意义，状态型设备忽略该值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    pub id: i64,
    pub name: String,
    pub line_id: Option<i64>,
    pub status: MachineStatus,
    #[serde(rename = "type")]
    pub machine_type: Option<String>,
    pub counter_type: CounterType,
    pub avg_pieces_per_sec: Option<f64>,
    pub product_id: Option<i64>,
}

impl Machine {
    /// 参与 OEE 计算的节拍（状态型设备恒为 None）
    pub fn effective_rate(&self) -> Option<f64> {
        match self.counter_type {
            CounterType::Status => None,
            CounterType::Counter => self.avg_pieces_per_sec,
        }
    }
}
