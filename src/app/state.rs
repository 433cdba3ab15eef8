// ==========================================
// MES 后端 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和 API 实例
// 说明: 所有 Repository 共用一个 SQLite 连接（Arc<Mutex<Connection>>）
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::api::{
    AlarmApi, ApiResult, AuthApi, ConfigApi, EventApi, MachineApi, OeeEvaluator, ProductApi,
    ProductionLineApi, ShiftApi, StopApi, UserApi, WorkOrderApi,
};
use crate::auth::{AccessPolicy, RolePolicy, TokenService};
use crate::config::{AppConfig, ConfigManager};
use crate::db::{ensure_schema, open_sqlite_connection, SharedConnection};
use crate::repository::{
    AlarmRepository, EventRepository, MachineRepository, ProductRepository,
    ProductionLineRepository, RepositoryError, ShiftRepository, StopRepository, UserRepository,
    WorkOrderRepository,
};

/// 应用状态
///
/// 包含所有 API 实例和共享资源，HTTP 层以 Arc<AppState> 持有
pub struct AppState {
    /// 数据库路径（内存库为 ":memory:"）
    pub db_path: String,

    pub machine_api: Arc<MachineApi>,
    pub production_line_api: Arc<ProductionLineApi>,
    pub shift_api: Arc<ShiftApi>,
    pub stop_api: Arc<StopApi>,
    pub alarm_api: Arc<AlarmApi>,
    pub event_api: Arc<EventApi>,
    pub product_api: Arc<ProductApi>,
    pub work_order_api: Arc<WorkOrderApi>,
    pub user_api: Arc<UserApi>,
    pub auth_api: Arc<AuthApi>,
    pub config_api: Arc<ConfigApi>,

    /// 令牌校验（HTTP 层解析 Bearer 令牌）
    pub token_service: Arc<TokenService>,

    /// 访问控制策略
    pub policy: Arc<dyn AccessPolicy>,
}

impl AppState {
    /// 按进程配置打开数据库并创建 AppState
    ///
    /// # 说明
    /// 1. 打开连接并幂等建表
    /// 2. 初始化所有 Repository 与 API
    /// 3. 配置了初始管理员且用户表为空时创建管理员
    pub fn new(config: &AppConfig) -> ApiResult<Self> {
        tracing::info!(db_path = %config.db_path, "初始化AppState");

        let conn = open_sqlite_connection(&config.db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        ensure_schema(&conn).map_err(RepositoryError::from)?;

        let state = Self::from_connection(
            Arc::new(Mutex::new(conn)),
            config.db_path.clone(),
            TokenService::new(&config.jwt_secret, config.token_ttl_minutes),
        )?;

        if let Some(admin) = &config.bootstrap_admin {
            state
                .user_api
                .ensure_bootstrap_admin(&admin.username, &admin.password)?;
        }
        Ok(state)
    }

    /// 内存数据库（测试用）
    pub fn in_memory(token_service: TokenService) -> ApiResult<Self> {
        let conn = Connection::open_in_memory().map_err(RepositoryError::from)?;
        crate::db::configure_sqlite_connection(&conn).map_err(RepositoryError::from)?;
        ensure_schema(&conn).map_err(RepositoryError::from)?;
        Self::from_connection(Arc::new(Mutex::new(conn)), ":memory:".to_string(), token_service)
    }

    /// 从已建表的连接创建 AppState
    pub fn from_connection(
        conn: SharedConnection,
        db_path: String,
        token_service: TokenService,
    ) -> ApiResult<Self> {
        // ==========================================
        // 初始化Repository层
        // ==========================================
        let machine_repo = Arc::new(MachineRepository::new(conn.clone()));
        let line_repo = Arc::new(ProductionLineRepository::new(conn.clone()));
        let shift_repo = Arc::new(ShiftRepository::new(conn.clone()));
        let stop_repo = Arc::new(StopRepository::new(conn.clone()));
        let alarm_repo = Arc::new(AlarmRepository::new(conn.clone()));
        let event_repo = Arc::new(EventRepository::new(conn.clone()));
        let product_repo = Arc::new(ProductRepository::new(conn.clone()));
        let work_order_repo = Arc::new(WorkOrderRepository::new(conn.clone()));
        let user_repo = Arc::new(UserRepository::new(conn.clone()));
        let config_manager = Arc::new(ConfigManager::from_connection(conn)?);

        // ==========================================
        // 初始化API层
        // ==========================================
        let evaluator = Arc::new(OeeEvaluator::new(stop_repo.clone(), config_manager.clone()));
        let token_service = Arc::new(token_service);

        tracing::info!("AppState初始化完成");
        Ok(Self {
            db_path,
            machine_api: Arc::new(MachineApi::new(
                machine_repo.clone(),
                shift_repo.clone(),
                evaluator.clone(),
            )),
            production_line_api: Arc::new(ProductionLineApi::new(
                line_repo,
                machine_repo,
                evaluator,
            )),
            shift_api: Arc::new(ShiftApi::new(shift_repo)),
            stop_api: Arc::new(StopApi::new(stop_repo)),
            alarm_api: Arc::new(AlarmApi::new(alarm_repo)),
            event_api: Arc::new(EventApi::new(event_repo)),
            product_api: Arc::new(ProductApi::new(product_repo)),
            work_order_api: Arc::new(WorkOrderApi::new(work_order_repo)),
            user_api: Arc::new(UserApi::new(user_repo.clone())),
            auth_api: Arc::new(AuthApi::new(user_repo, token_service.clone())),
            config_api: Arc::new(ConfigApi::new(config_manager)),
            token_service,
            policy: Arc::new(RolePolicy),
        })
    }
}
