// ==========================================
// MES 后端 - 路由表
// ==========================================

mod accounts;
mod floor;
mod machines;
mod orders;

pub use accounts::{auth_routes, config_routes, settings_routes, user_routes};
pub use floor::{alarm_routes, event_routes, shift_routes, stop_routes};
pub use machines::{machine_routes, production_line_routes};
pub use orders::{product_routes, work_order_routes};
