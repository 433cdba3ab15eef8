// ==========================================
// MES 后端 - 配置层
// ==========================================
// 职责:
// - 进程配置（环境变量）: AppConfig
// - 车间配置（config_kv 表）: ConfigManager
// ==========================================

pub mod app_config;
pub mod config_manager;

// 重导出核心配置类型
pub use app_config::{get_default_db_path, AppConfig, BootstrapAdmin, ConfigError};
pub use config_manager::{config_keys, ConfigItem, ConfigManager, OeeSettings};
