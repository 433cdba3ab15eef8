// ==========================================
// MES 后端 - 服务入口
// ==========================================

use std::sync::Arc;

use anyhow::Context;
use mes_backend::app::AppState;
use mes_backend::config::AppConfig;
use mes_backend::{http, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志系统
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", mes_backend::APP_NAME);
    tracing::info!("系统版本: {}", mes_backend::VERSION);
    tracing::info!("==================================================");

    let config = AppConfig::from_env().context("读取进程配置失败")?;
    tracing::info!(db_path = %config.db_path, bind_addr = %config.bind_addr, "使用配置");

    // 打开数据库与建表均为阻塞操作
    let init_config = config.clone();
    let state = tokio::task::spawn_blocking(move || AppState::new(&init_config))
        .await
        .context("AppState 初始化任务失败")?
        .context("无法初始化AppState")?;

    http::serve(Arc::new(state), config.bind_addr, config.cors_permissive).await
}
