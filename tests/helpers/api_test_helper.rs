// ==========================================
// API集成测试辅助工具
// ==========================================
// 职责: 提供API层集成测试的通用环境与数据准备
// ==========================================

#![allow(dead_code)]

#[path = "../test_helpers.rs"]
mod test_helpers;

pub use test_helpers::{create_test_db, test_app_config, TEST_JWT_SECRET};

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, TimeZone, Utc};
use tempfile::NamedTempFile;

use mes_backend::api::{CreateUserInput, MachineInput, ProductionLineInput, StopInput};
use mes_backend::app::AppState;
use mes_backend::auth::{Principal, TokenService};
use mes_backend::db::open_sqlite_connection;
use mes_backend::domain::{CounterType, ProductionHistoryEntry, Role};
use mes_backend::repository::ProductionLineRepository;

// ==========================================
// API测试环境
// ==========================================

/// API测试环境
///
/// AppState 与 Repository 共用同一个连接，Repository 只用于准备 API 不暴露的数据
pub struct ApiTestEnv {
    pub db_path: String,
    pub state: Arc<AppState>,
    pub line_repo: Arc<ProductionLineRepository>,

    // 临时文件（确保生命周期）
    _temp_file: NamedTempFile,
}

impl ApiTestEnv {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        mes_backend::logging::init_test();

        let (temp_file, db_path) = create_test_db()?;
        let conn = Arc::new(Mutex::new(open_sqlite_connection(&db_path)?));

        let state = AppState::from_connection(
            conn.clone(),
            db_path.clone(),
            TokenService::new(TEST_JWT_SECRET, 30),
        )?;

        Ok(Self {
            db_path,
            state: Arc::new(state),
            line_repo: Arc::new(ProductionLineRepository::new(conn)),
            _temp_file: temp_file,
        })
    }

    // ==========================================
    // 数据准备
    // ==========================================

    pub fn seed_line(&self, name: &str) -> i64 {
        self.state
            .production_line_api
            .create_line(ProductionLineInput {
                name: name.to_string(),
                status: Some("STOPPED".to_string()),
                shift_quantity: 0,
                ..Default::default()
            })
            .expect("创建产线失败")
    }

    pub fn seed_status_machine(&self, name: &str, line_id: Option<i64>, status: &str) -> i64 {
        self.state
            .machine_api
            .create_machine(MachineInput {
                name: name.to_string(),
                line_id,
                status: Some(status.to_string()),
                counter_type: CounterType::Status,
                ..Default::default()
            })
            .expect("创建设备失败")
    }

    pub fn seed_counter_machine(&self, name: &str, line_id: Option<i64>, rate: Option<f64>) -> i64 {
        self.state
            .machine_api
            .create_machine(MachineInput {
                name: name.to_string(),
                line_id,
                status: Some("RUNNING".to_string()),
                counter_type: CounterType::Counter,
                avg_pieces_per_sec: rate,
                ..Default::default()
            })
            .expect("创建设备失败")
    }

    /// 停机记录；end 为 None 表示未结束
    pub fn seed_stop(
        &self,
        machine_id: i64,
        start: DateTime<Utc>,
        end: Option<DateTime<Utc>>,
    ) -> i64 {
        self.state
            .stop_api
            .create_stop(StopInput {
                machine_id: Some(machine_id),
                reason: Some("换模".to_string()),
                start_time: Some(start.to_rfc3339()),
                end_time: end.map(|e| e.to_rfc3339()),
                resolved: None,
            })
            .expect("创建停机记录失败")
    }

    pub fn seed_history(&self, line_id: i64, code: &str, label: &str, qty: &str) {
        self.line_repo
            .insert_history(
                line_id,
                &ProductionHistoryEntry {
                    code: code.to_string(),
                    label: label.to_string(),
                    qty: qty.to_string(),
                },
            )
            .expect("写入生产记录失败");
    }

    pub fn seed_user(&self, username: &str, password: &str, role: Role) -> i64 {
        self.state
            .user_api
            .create_user(CreateUserInput {
                full_name: format!("{} 测试", username),
                username: username.to_string(),
                password: Some(password.to_string()),
                email: format!("{}@example.com", username),
                role: role.to_db_str().to_string(),
                status: None,
            })
            .expect("创建用户失败")
    }

    /// 为指定角色创建用户并签发令牌
    pub fn token_for(&self, username: &str, role: Role) -> String {
        let user_id = self.seed_user(username, "secret-pass", role);
        self.state
            .token_service
            .issue(&Principal {
                user_id,
                username: username.to_string(),
                role,
            })
            .expect("签发令牌失败")
    }
}

// ==========================================
// 时间辅助
// ==========================================

/// 固定评估时刻
pub fn eval_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, 16, 0, 0).unwrap()
}

/// 评估时刻之前 minutes 分钟
pub fn minutes_before_now(minutes: i64) -> DateTime<Utc> {
    eval_now() - Duration::minutes(minutes)
}
