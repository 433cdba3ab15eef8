// ==========================================
// MES 后端 - 应用层
// ==========================================
// 职责: 组装 Repository / API，供 HTTP 层共享
// ==========================================

pub mod state;

// 重导出
pub use state::AppState;
