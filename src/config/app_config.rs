// ==========================================
// MES 后端 - 进程级配置
// ==========================================
// 来源: 环境变量（启动时由 dotenvy 加载可选的 .env）
// ==========================================

use crate::auth::token::MAX_TOKEN_TTL_MINUTES;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

pub const ENV_DB_PATH: &str = "MES_DB_PATH";
pub const ENV_BIND_ADDR: &str = "MES_BIND_ADDR";
pub const ENV_JWT_SECRET: &str = "MES_JWT_SECRET";
pub const ENV_TOKEN_TTL_MINUTES: &str = "MES_TOKEN_TTL_MINUTES";
pub const ENV_CORS_PERMISSIVE: &str = "MES_CORS_PERMISSIVE";
pub const ENV_ADMIN_USERNAME: &str = "MES_ADMIN_USERNAME";
pub const ENV_ADMIN_PASSWORD: &str = "MES_ADMIN_PASSWORD";

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 60;

/// 仅 debug 构建可用的开发密钥
#[cfg(debug_assertions)]
const DEV_JWT_SECRET: &str = "mes-backend-dev-secret";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("缺少必需的环境变量: {0}")]
    MissingVar(&'static str),

    #[error("环境变量取值非法 ({key}={value}): {message}")]
    InvalidVar {
        key: &'static str,
        value: String,
        message: String,
    },
}

/// 进程配置
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: String,
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
    pub cors_permissive: bool,
    /// 用户表为空时创建的初始管理员
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

/// 初始管理员账号（仅在用户表为空时生效）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapAdmin {
    pub username: String,
    pub password: String,
}

impl AppConfig {
    /// 从进程环境读取配置
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意 key 查找函数读取配置（便于测试时不污染进程环境）
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let db_path = get(ENV_DB_PATH).unwrap_or_else(get_default_db_path);

        let raw_addr = get(ENV_BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw_addr
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidVar {
                key: ENV_BIND_ADDR,
                value: raw_addr.clone(),
                message: e.to_string(),
            })?;

        let jwt_secret = match get(ENV_JWT_SECRET) {
            Some(secret) => secret,
            None => default_jwt_secret()?,
        };

        let token_ttl_minutes = match get(ENV_TOKEN_TTL_MINUTES) {
            Some(raw) => match raw.parse::<i64>() {
                Ok(v) if (1..=MAX_TOKEN_TTL_MINUTES).contains(&v) => v,
                _ => {
                    return Err(ConfigError::InvalidVar {
                        key: ENV_TOKEN_TTL_MINUTES,
                        value: raw,
                        message: format!("必须为 1..={} 的整数", MAX_TOKEN_TTL_MINUTES),
                    })
                }
            },
            None => DEFAULT_TOKEN_TTL_MINUTES,
        };

        let cors_permissive = match get(ENV_CORS_PERMISSIVE) {
            Some(raw) => parse_bool(&raw).ok_or_else(|| ConfigError::InvalidVar {
                key: ENV_CORS_PERMISSIVE,
                value: raw.clone(),
                message: "必须为 true/false".to_string(),
            })?,
            None => true,
        };

        let bootstrap_admin = match (get(ENV_ADMIN_USERNAME), get(ENV_ADMIN_PASSWORD)) {
            (Some(username), Some(password)) => Some(BootstrapAdmin { username, password }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::MissingVar(ENV_ADMIN_PASSWORD)),
            (None, Some(_)) => return Err(ConfigError::MissingVar(ENV_ADMIN_USERNAME)),
        };

        Ok(Self {
            db_path,
            bind_addr,
            jwt_secret,
            token_ttl_minutes,
            cors_permissive,
            bootstrap_admin,
        })
    }
}

#[cfg(debug_assertions)]
fn default_jwt_secret() -> Result<String, ConfigError> {
    tracing::warn!("未设置 {}，使用开发密钥", ENV_JWT_SECRET);
    Ok(DEV_JWT_SECRET.to_string())
}

#[cfg(not(debug_assertions))]
fn default_jwt_secret() -> Result<String, ConfigError> {
    Err(ConfigError::MissingVar(ENV_JWT_SECRET))
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// 获取默认数据库路径
///
/// # 返回
/// - 开发环境: 用户数据目录/mes-backend-dev/mes.db
/// - 生产环境: 用户数据目录/mes-backend/mes.db
/// - 无法获取用户数据目录时: ./mes.db
pub fn get_default_db_path() -> String {
    let mut path = PathBuf::from("./mes.db");

    if let Some(data_dir) = dirs::data_dir() {
        #[cfg(debug_assertions)]
        {
            path = data_dir.join("mes-backend-dev");
        }

        #[cfg(not(debug_assertions))]
        {
            path = data_dir.join("mes-backend");
        }

        // 目录创建失败时交给 open 报错
        std::fs::create_dir_all(&path).ok();
        path = path.join("mes.db");
    }

    path.to_string_lossy().to_string()
}
