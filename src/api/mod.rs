// ==========================================
// MES 后端 - API 层
// ==========================================
// 职责: 业务 API（输入校验、业务规则、组装视图），供 HTTP 层调用
// 约束: 不感知 HTTP；鉴权由 HTTP 层经 AccessPolicy 完成
// ==========================================

pub mod alarm_api;
pub mod auth_api;
pub mod config_api;
pub mod error;
pub mod input;
pub mod machine_api;
pub mod oee_evaluator;
pub mod product_api;
pub mod production_line_api;
pub mod shift_api;
pub mod stop_api;
pub mod user_api;
pub mod work_order_api;

// 重导出核心类型
pub use alarm_api::{AlarmApi, AlarmInput, EventApi, EventInput};
pub use auth_api::{AuthApi, LoginForm, LoginResponse};
pub use config_api::{ConfigApi, ConfigOverview};
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use machine_api::{MachineApi, MachineInput, MachineView, OeeReport};
pub use oee_evaluator::{EvaluationContext, OeeEvaluator};
pub use product_api::{ProductApi, ProductInput};
pub use production_line_api::{
    ProductionLineApi, ProductionLineDetail, ProductionLineInput, ProductionLineSummary,
};
pub use shift_api::{ShiftApi, ShiftInput};
pub use stop_api::{StopApi, StopInput};
pub use user_api::{CreateUserInput, PatchOutcome, ProfileInput, UpdateUserInput, UserApi};
pub use work_order_api::{WorkOrderApi, WorkOrderInput};
