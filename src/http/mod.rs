// ==========================================
// MES 后端 - HTTP 层
// ==========================================
// 职责: 路由、调用方身份提取、错误映射、服务启动
// 约束: 同步 API 调用一律经 spawn_blocking 执行
// ==========================================

pub mod error;
pub mod extract;
pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::app::AppState;

pub use error::blocking;
pub use extract::Caller;

/// 路由共享状态
pub type SharedState = Arc<AppState>;

pub const ROOT_MESSAGE: &str = "MES Backend API";

/// 构建完整路由
///
/// # 参数
/// - state: 应用状态
/// - cors_permissive: 是否允许任意来源跨域
pub fn router(state: SharedState, cors_permissive: bool) -> Router {
    let app = Router::new()
        .route("/", get(root))
        .nest("/api/auth", routes::auth_routes())
        .nest("/api/settings", routes::settings_routes())
        .nest("/api/machines", routes::machine_routes())
        .nest("/api/production-lines", routes::production_line_routes())
        .nest("/api/shifts", routes::shift_routes())
        .nest("/api/stops", routes::stop_routes())
        .nest("/api/alarms", routes::alarm_routes())
        .nest("/api/events", routes::event_routes())
        .nest("/api/products", routes::product_routes())
        .nest("/api/workorders", routes::work_order_routes())
        .nest("/api/users", routes::user_routes())
        .nest("/api/config", routes::config_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if cors_permissive {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}

async fn root() -> Json<Value> {
    Json(json!({ "message": ROOT_MESSAGE }))
}

/// 启动 HTTP 服务，Ctrl-C 后优雅退出
pub async fn serve(state: SharedState, addr: SocketAddr, cors_permissive: bool) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "HTTP 服务已启动");

    axum::serve(listener, router(state, cors_permissive))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("HTTP 服务已停止");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "无法监听 Ctrl-C 信号");
        std::future::pending::<()>().await;
    }
    tracing::info!("收到退出信号");
}
