// ==========================================
// MES 后端 - 领域类型定义
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 计数类型 (Counter Type)
// ==========================================
// status: 只上报运行/停止，按 1 件/秒 折算产出
// counter: 按平均节拍 (件/秒) 折算产出
// 前端表单使用 "piece" 表示计数型设备，反序列化时等同 counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterType {
    Status,
    #[serde(alias = "piece")]
    Counter,
}

impl CounterType {
    /// 从数据库字符串解析
    ///
    /// 非 "status" 一律视为计数型（与历史数据口径一致）
    pub fn from_db_str(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("status") {
            CounterType::Status
        } else {
            CounterType::Counter
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            CounterType::Status => "status",
            CounterType::Counter => "counter",
        }
    }
}

impl Default for CounterType {
    fn default() -> Self {
        CounterType::Status
    }
}

impl fmt::Display for CounterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}

// ==========================================
// 设备运行状态 (Machine Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MachineStatus {
    Running,
    Stopped,
}

impl MachineStatus {
    /// 严格解析（忽略大小写），未知值返回 None
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "RUNNING" => Some(MachineStatus::Running),
            "STOPPED" => Some(MachineStatus::Stopped),
            _ => None,
        }
    }

    /// 读库用，未知值按 STOPPED 处理
    pub fn from_db_str(s: &str) -> Self {
        Self::parse(s).unwrap_or(MachineStatus::Stopped)
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            MachineStatus::Running => "RUNNING",
            MachineStatus::Stopped => "STOPPED",
        }
    }
}

impl fmt::Display for MachineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}

// ==========================================
// 用户角色 (Role)
// ==========================================
// 权限由高到低: Admin > Moderator > User
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Moderator,
    User,
}

impl Role {
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "moderator" => Some(Role::Moderator),
            "user" => Some(Role::User),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Moderator => "Moderator",
            Role::User => "User",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}

// ==========================================
// 停机窗口口径 (Downtime Window Policy)
// ==========================================
// STARTED_IN_WINDOW: 只统计开始时间落在窗口内的停机（历史口径）
// OVERLAPS_WINDOW: 统计与窗口有交集的停机，开始时间截断到窗口起点
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DowntimeWindowPolicy {
    StartedInWindow,
    OverlapsWindow,
}

impl DowntimeWindowPolicy {
    pub fn from_config_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "STARTED_IN_WINDOW" => Some(DowntimeWindowPolicy::StartedInWindow),
            "OVERLAPS_WINDOW" => Some(DowntimeWindowPolicy::OverlapsWindow),
            _ => None,
        }
    }

    pub fn to_config_str(&self) -> &'static str {
        match self {
            DowntimeWindowPolicy::StartedInWindow => "STARTED_IN_WINDOW",
            DowntimeWindowPolicy::OverlapsWindow => "OVERLAPS_WINDOW",
        }
    }
}

impl Default for DowntimeWindowPolicy {
    fn default() -> Self {
        DowntimeWindowPolicy::StartedInWindow
    }
}

impl fmt::Display for DowntimeWindowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_config_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_type_accepts_piece_alias() {
        let ct: CounterType = serde_json::from_str("\"piece\"").unwrap();
        assert_eq!(ct, CounterType::Counter);
        let ct: CounterType = serde_json::from_str("\"status\"").unwrap();
        assert_eq!(ct, CounterType::Status);
    }

    #[test]
    fn test_counter_type_db_parsing() {
        assert_eq!(CounterType::from_db_str("status"), CounterType::Status);
        assert_eq!(CounterType::from_db_str("piece"), CounterType::Counter);
        assert_eq!(CounterType::from_db_str("counter"), CounterType::Counter);
    }

    #[test]
    fn test_machine_status_parsing() {
        assert_eq!(MachineStatus::parse("running"), Some(MachineStatus::Running));
        assert_eq!(MachineStatus::parse(" STOPPED "), Some(MachineStatus::Stopped));
        assert_eq!(MachineStatus::parse("RUNING"), None);
        assert_eq!(MachineStatus::from_db_str("RUNING"), MachineStatus::Stopped);
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!(Role::from_db_str("Admin"), Some(Role::Admin));
        assert_eq!(Role::from_db_str("moderator"), Some(Role::Moderator));
        assert_eq!(Role::from_db_str("Guest"), None);
    }

    #[test]
    fn test_downtime_policy_parsing() {
        assert_eq!(
            DowntimeWindowPolicy::from_config_str("overlaps_window"),
            Some(DowntimeWindowPolicy::OverlapsWindow)
        );
        assert_eq!(DowntimeWindowPolicy::from_config_str("bogus"), None);
    }
}
