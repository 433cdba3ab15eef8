// ==========================================
// MES 后端 - 计算引擎层
// ==========================================
// 职责: 纯计算（停机汇总、OEE、产线汇总），不拼 SQL，不做 I/O
// ==========================================

pub mod downtime;
pub mod line_rollup;
pub mod oee;
pub mod shift_window;

// 重导出核心函数与类型
pub use downtime::{compute_downtime, compute_downtime_with_policy};
pub use line_rollup::{average_oee, derive_line_status};
pub use oee::{compute_oee, OeeResult};
pub use shift_window::ShiftWindow;
