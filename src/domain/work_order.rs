// ==========================================
// MES 后端 - 工单实体
// ==========================================

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// 已完成状态（终态，不可回退）
pub const WORK_ORDER_STATUS_COMPLETED: &str = "Completed";

/// 工单
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkOrder {
    pub id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub status: String,
    pub due_date: Option<NaiveDate>,
    pub assigned_line_id: Option<i64>,
    /// 完成进度 [0, 1]
    pub progress: f64,
    pub alarms: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
