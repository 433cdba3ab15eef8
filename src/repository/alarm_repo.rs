// ==========================================
// MES 后端 - 告警数据仓储
// ==========================================

use crate::db::SharedConnection;
use crate::domain::alarm::Alarm;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sql_utils::{format_ts, format_ts_opt, get_ts, get_ts_opt};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::MutexGuard;

#[derive(Debug, Clone, PartialEq)]
pub struct AlarmDraft {
    pub machine_id: i64,
    pub code: String,
    pub description: Option<String>,
    pub occurred_at: DateTime<Utc>,
    pub cleared_at: Option<DateTime<Utc>>,
}

const SELECT_COLUMNS: &str =
    "SELECT id, machine_id, code, description, occurred_at, cleared_at FROM alarms";

pub struct AlarmRepository {
    conn: SharedConnection,
}

impl AlarmRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> SqliteResult<Alarm> {
        Ok(Alarm {
            id: row.get(0)?,
            machine_id: row.get(1)?,
            code: row.get(2)?,
            description: row.get(3)?,
            occurred_at: get_ts(row, 4)?,
            cleared_at: get_ts_opt(row, 5)?,
        })
    }

    pub fn list_all(&self) -> RepositoryResult<Vec<Alarm>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare(&format!("{} ORDER BY occurred_at DESC, id DESC", SELECT_COLUMNS))?;
        let alarms = stmt
            .query_map([], Self::map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(alarms)
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Alarm>> {
        let conn = self.get_conn()?;
        let alarm = conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                params![id],
                Self::map_row,
            )
            .optional()?;
        Ok(alarm)
    }

    pub fn insert(&self, draft: &AlarmDraft) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO alarms (machine_id, code, description, occurred_at, cleared_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                draft.machine_id,
                draft.code,
                draft.description,
                format_ts(&draft.occurred_at),
                format_ts_opt(&draft.cleared_at),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn update(&self, id: i64, draft: &AlarmDraft) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE alarms
            SET machine_id = ?1, code = ?2, description = ?3, occurred_at = ?4, cleared_at = ?5
            WHERE id = ?6
            "#,
            params![
                draft.machine_id,
                draft.code,
                draft.description,
                format_ts(&draft.occurred_at),
                format_ts_opt(&draft.cleared_at),
                id,
            ],
        )?;
        Ok(affected)
    }

    pub fn delete(&self, id: i64) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM alarms WHERE id = ?1", params![id])?;
        Ok(affected)
    }
}
