// ==========================================
// MES 后端 - 用户实体
// ==========================================

use crate::domain::types::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const USER_STATUS_ACTIVE: &str = "Active";
pub const USER_STATUS_BANNED: &str = "Banned";

/// 用户
///
/// password_hash 不参与序列化，任何接口都不返回
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub full_name: String,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub email: String,
    pub role: Role,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_banned(&self) -> bool {
        self.status.eq_ignore_ascii_case(USER_STATUS_BANNED)
    }
}
