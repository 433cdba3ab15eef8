// ==========================================
// MES 后端 - 配置管理器
// ==========================================
// 职责: 车间级配置的加载、查询、覆写
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::db::SharedConnection;
use crate::domain::types::DowntimeWindowPolicy;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use serde::{Deserialize, Serialize};
use std::sync::MutexGuard;
use tracing::warn;

/// 默认计划时长（秒）
pub const DEFAULT_PLANNED_TIME_SECS: f64 = 28_800.0;

/// 默认评估窗口（小时）
pub const DEFAULT_WINDOW_HOURS: i64 = 8;

/// 评估窗口上限（小时），约一年
pub const MAX_WINDOW_HOURS: i64 = 24 * 366;

/// 评估窗口取值是否合法
pub fn is_valid_window_hours(hours: i64) -> bool {
    (1..=MAX_WINDOW_HOURS).contains(&hours)
}

// ==========================================
// OeeSettings - OEE 计算参数
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OeeSettings {
    pub planned_time_secs: f64,
    pub window_hours: i64,
    pub downtime_policy: DowntimeWindowPolicy,
}

impl Default for OeeSettings {
    fn default() -> Self {
        Self {
            planned_time_secs: DEFAULT_PLANNED_TIME_SECS,
            window_hours: DEFAULT_WINDOW_HOURS,
            downtime_policy: DowntimeWindowPolicy::default(),
        }
    }
}

/// 配置项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigItem {
    pub scope_id: String,
    pub key: String,
    pub value: String,
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: SharedConnection,
}

impl ConfigManager {
    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: SharedConnection) -> RepositoryResult<Self> {
        {
            let conn_guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取 global scope 的配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入 global scope 配置（存在则覆盖）
    pub fn set_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let key = key.trim();
        if key.is_empty() {
            return Err(RepositoryError::FieldValueError {
                field: "key".to_string(),
                message: "配置键不能为空".to_string(),
            });
        }

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES ('global', ?1, ?2, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    /// 查询全部配置
    pub fn list_configs(&self) -> RepositoryResult<Vec<ConfigItem>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT scope_id, key, value FROM config_kv ORDER BY scope_id, key")?;
        let items = stmt
            .query_map([], |row| {
                Ok(ConfigItem {
                    scope_id: row.get(0)?,
                    key: row.get(1)?,
                    value: row.get(2)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(items)
    }

    // ===== OEE 配置 =====

    /// 读取 OEE 计算参数
    ///
    /// 缺失或非法的值回退到默认值（记录 warn 日志），不会因配置错误导致接口失败。
    pub fn get_oee_settings(&self) -> RepositoryResult<OeeSettings> {
        let defaults = OeeSettings::default();

        let planned_time_secs = match self.get_global_config_value(config_keys::OEE_PLANNED_TIME_SECS)? {
            Some(raw) => match raw.trim().parse::<f64>() {
                Ok(v) if v.is_finite() && v >= 0.0 => v,
                _ => {
                    warn!(key = config_keys::OEE_PLANNED_TIME_SECS, value = %raw, "配置值非法，使用默认值");
                    defaults.planned_time_secs
                }
            },
            None => defaults.planned_time_secs,
        };

        let window_hours = match self.get_global_config_value(config_keys::OEE_WINDOW_HOURS)? {
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(v) if is_valid_window_hours(v) => v,
                _ => {
                    warn!(key = config_keys::OEE_WINDOW_HOURS, value = %raw, "配置值非法，使用默认值");
                    defaults.window_hours
                }
            },
            None => defaults.window_hours,
        };

        let downtime_policy = match self.get_global_config_value(config_keys::DOWNTIME_WINDOW_POLICY)? {
            Some(raw) => DowntimeWindowPolicy::from_config_str(&raw).unwrap_or_else(|| {
                warn!(key = config_keys::DOWNTIME_WINDOW_POLICY, value = %raw, "配置值非法，使用默认值");
                defaults.downtime_policy
            }),
            None => defaults.downtime_policy,
        };

        Ok(OeeSettings {
            planned_time_secs,
            window_hours,
            downtime_policy,
        })
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // OEE
    pub const OEE_PLANNED_TIME_SECS: &str = "oee_planned_time_secs";
    pub const OEE_WINDOW_HOURS: &str = "oee_window_hours";

    // 停机汇总
    pub const DOWNTIME_WINDOW_POLICY: &str = "downtime_window_policy";
}
