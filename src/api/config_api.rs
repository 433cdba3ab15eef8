// ==========================================
// MES 后端 - 配置管理 API
// ==========================================
// 职责: 车间级配置查询、更新
// 约束: 只接受已知配置键，写入前按键校验取值
// ==========================================

use std::sync::Arc;

use serde::Serialize;

use crate::api::error::{ApiError, ApiResult};
use crate::auth::policy::Principal;
use crate::config::config_manager::{
    config_keys, is_valid_window_hours, ConfigItem, ConfigManager, OeeSettings,
};
use crate::domain::types::DowntimeWindowPolicy;

/// 可通过 API 修改的配置键
pub const KNOWN_KEYS: &[&str] = &[
    config_keys::OEE_PLANNED_TIME_SECS,
    config_keys::OEE_WINDOW_HOURS,
    config_keys::DOWNTIME_WINDOW_POLICY,
];

pub struct ConfigApi {
    config_manager: Arc<ConfigManager>,
}

impl ConfigApi {
    pub fn new(config_manager: Arc<ConfigManager>) -> Self {
        Self { config_manager }
    }

    /// 查询全部配置（原始键值 + 生效的 OEE 参数）
    pub fn list_configs(&self) -> ApiResult<ConfigOverview> {
        Ok(ConfigOverview {
            items: self.config_manager.list_configs()?,
            effective: self.config_manager.get_oee_settings()?,
        })
    }

    /// 更新单个配置项
    ///
    /// # 返回
    /// - Err(ApiError::InvalidInput): 未知配置键
    /// - Err(ApiError::ValidationError): 取值不合法
    pub fn update_config(&self, key: &str, value: &str, operator: &Principal) -> ApiResult<()> {
        let key = key.trim();
        let value = value.trim();
        validate_config_value(key, value)?;

        self.config_manager.set_config_value(key, value)?;
        tracing::info!(key, value, operator = %operator.username, "配置已更新");
        Ok(())
    }
}

fn validate_config_value(key: &str, value: &str) -> ApiResult<()> {
    let valid = match key {
        config_keys::OEE_PLANNED_TIME_SECS => value
            .parse::<f64>()
            .map(|v| v.is_finite() && v >= 0.0)
            .unwrap_or(false),
        config_keys::OEE_WINDOW_HOURS => value
            .parse::<i64>()
            .map(is_valid_window_hours)
            .unwrap_or(false),
        config_keys::DOWNTIME_WINDOW_POLICY => DowntimeWindowPolicy::from_config_str(value).is_some(),
        _ => {
            return Err(ApiError::InvalidInput(format!(
                "unknown config key: {} (expected one of {})",
                key,
                KNOWN_KEYS.join(", ")
            )))
        }
    };
    if !valid {
        return Err(ApiError::ValidationError(format!(
            "invalid value for {}: {}",
            key, value
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigOverview {
    pub items: Vec<ConfigItem>,
    pub effective: OeeSettings,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use crate::domain::types::Role;
    use std::sync::{Arc, Mutex};

    fn api() -> ConfigApi {
        let conn = Arc::new(Mutex::new(open_in_memory().unwrap()));
        ConfigApi::new(Arc::new(ConfigManager::from_connection(conn).unwrap()))
    }

    fn admin() -> Principal {
        Principal {
            user_id: 1,
            username: "admin".to_string(),
            role: Role::Admin,
        }
    }

    #[test]
    fn test_update_known_key() {
        let api = api();
        api.update_config(config_keys::OEE_WINDOW_HOURS, "12", &admin())
            .unwrap();
        api.update_config(config_keys::DOWNTIME_WINDOW_POLICY, "overlaps_window", &admin())
            .unwrap();

        let overview = api.list_configs().unwrap();
        assert_eq!(overview.items.len(), 2);
        assert_eq!(overview.effective.window_hours, 12);
        assert_eq!(
            overview.effective.downtime_policy,
            DowntimeWindowPolicy::OverlapsWindow
        );
    }

    #[test]
    fn test_rejects_unknown_key_and_bad_value() {
        let api = api();
        let err = api.update_config("colour", "blue", &admin()).unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");

        let err = api
            .update_config(config_keys::OEE_PLANNED_TIME_SECS, "-5", &admin())
            .unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");

        let err = api
            .update_config(config_keys::OEE_WINDOW_HOURS, "0", &admin())
            .unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_rejects_window_beyond_one_year() {
        let api = api();
        let err = api
            .update_config(config_keys::OEE_WINDOW_HOURS, "9223372036854775807", &admin())
            .unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
        let err = api
            .update_config(config_keys::OEE_WINDOW_HOURS, "8785", &admin())
            .unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");

        api.update_config(config_keys::OEE_WINDOW_HOURS, "8784", &admin())
            .unwrap();
        assert_eq!(api.list_configs().unwrap().effective.window_hours, 8784);
    }
}
