// ==========================================
// MES 后端 - 产品实体
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const PRODUCT_STATUS_ACTIVE: &str = "Active";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
