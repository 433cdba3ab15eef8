// ==========================================
// MES 后端 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod alarm_repo;
pub mod error;
pub mod event_repo;
pub mod machine_repo;
pub mod product_repo;
pub mod production_line_repo;
pub mod shift_repo;
pub mod sql_utils;
pub mod stop_repo;
pub mod user_repo;
pub mod work_order_repo;

// 重导出核心仓储
pub use alarm_repo::{AlarmDraft, AlarmRepository};
pub use error::{RepositoryError, RepositoryResult};
pub use event_repo::{EventDraft, EventRepository};
pub use machine_repo::{MachineDraft, MachineRepository};
pub use product_repo::{ProductDraft, ProductRepository};
pub use production_line_repo::{ProductionLineDraft, ProductionLineRepository};
pub use shift_repo::{ShiftDraft, ShiftRepository};
pub use stop_repo::{StopDraft, StopRepository};
pub use user_repo::{NewUser, UserPatch, UserRepository};
pub use work_order_repo::{WorkOrderDraft, WorkOrderRepository};
