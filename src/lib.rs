// ==========================================
// MES 后端 - 核心库
// ==========================================
// 技术栈: axum + Rust + SQLite
// 系统定位: 车间设备/产线/工单管理，实时 OEE
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 停机汇总与 OEE 计算
pub mod engine;

// 配置层 - 进程配置与车间配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// 认证与访问控制
pub mod auth;

// API 层 - 业务接口
pub mod api;

// 应用层 - 共享状态
pub mod app;

// HTTP 层 - 路由与服务
pub mod http;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{CounterType, DowntimeWindowPolicy, MachineStatus, Role};

// 领域实体
pub use domain::{Alarm, Machine, MachineEvent, Product, ProductionLine, Shift, Stop, User, WorkOrder};

// 引擎
pub use engine::{compute_downtime, compute_oee, OeeResult, ShiftWindow};

// API
pub use api::{ApiError, ApiResult, MachineApi, ProductionLineApi};

// 应用
pub use app::AppState;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "MES Backend";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
