// ==========================================
// MES 后端 - 产线实体
// ==========================================

use crate::domain::types::MachineStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 产线
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionLine {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub status: MachineStatus,
    pub shift_quantity: i64,
    pub created_at: DateTime<Utc>,
}

/// 产线当前批次
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    pub id: i64,
    pub name: String,
    pub current: i64,
    pub target: i64,
    pub elapsed: Option<String>,
}

/// 产线生产履历
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionHistoryEntry {
    pub code: String,
    pub label: String,
    pub qty: String,
}
