// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、进程配置等功能
// ==========================================

#![allow(dead_code)]

use std::error::Error;

use mes_backend::config::{AppConfig, BootstrapAdmin};
use mes_backend::db::{ensure_schema, open_sqlite_connection};
use tempfile::NamedTempFile;

pub const TEST_JWT_SECRET: &str = "test-secret";

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file
        .path()
        .to_str()
        .ok_or("临时文件路径不是合法 UTF-8")?
        .to_string();

    let conn = open_sqlite_connection(&db_path)?;
    ensure_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 指向测试数据库的进程配置
pub fn test_app_config(db_path: &str, bootstrap_admin: Option<(&str, &str)>) -> AppConfig {
    AppConfig {
        db_path: db_path.to_string(),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        jwt_secret: TEST_JWT_SECRET.to_string(),
        token_ttl_minutes: 30,
        cors_permissive: false,
        bootstrap_admin: bootstrap_admin.map(|(username, password)| BootstrapAdmin {
            username: username.to_string(),
            password: password.to_string(),
        }),
    }
}
