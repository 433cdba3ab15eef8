// ==========================================
// MES 后端 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 约束: 不含数据访问逻辑,不含计算引擎逻辑
// ==========================================

pub mod alarm;
pub mod machine;
pub mod product;
pub mod production_line;
pub mod shift;
pub mod stop;
pub mod types;
pub mod user;
pub mod work_order;

// 重导出核心类型
pub use alarm::{Alarm, MachineEvent};
pub use machine::Machine;
pub use product::Product;
pub use production_line::{Batch, ProductionHistoryEntry, ProductionLine};
pub use shift::Shift;
pub use stop::{Stop, StopInterval};
pub use types::{CounterType, DowntimeWindowPolicy, MachineStatus, Role};
pub use user::User;
pub use work_order::WorkOrder;
