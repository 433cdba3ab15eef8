// ==========================================
// MES 后端 - 班次数据仓储
// ==========================================

use crate::db::SharedConnection;
use crate::domain::shift::Shift;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sql_utils::{get_time, DB_TIME_FORMAT};
use chrono::NaiveTime;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::MutexGuard;

/// 班次写入数据
#[derive(Debug, Clone, PartialEq)]
pub struct ShiftDraft {
    pub line_id: Option<i64>,
    pub name: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub shift_quantity: i64,
    pub operator: Option<String>,
    pub duration: Option<f64>,
}

const SELECT_COLUMNS: &str = "SELECT id, line_id, name, start_time, end_time, shift_quantity, operator, duration FROM shifts";

pub struct ShiftRepository {
    conn: SharedConnection,
}

impl ShiftRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> SqliteResult<Shift> {
        Ok(Shift {
            id: row.get(0)?,
            line_id: row.get(1)?,
            name: row.get(2)?,
            start_time: get_time(row, 3)?,
            end_time: get_time(row, 4)?,
            shift_quantity: row.get(5)?,
            operator: row.get(6)?,
            duration: row.get(7)?,
        })
    }

    pub fn list_all(&self) -> RepositoryResult<Vec<Shift>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!("{} ORDER BY id ASC", SELECT_COLUMNS))?;
        let shifts = stmt
            .query_map([], Self::map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(shifts)
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Shift>> {
        let conn = self.get_conn()?;
        let shift = conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                params![id],
                Self::map_row,
            )
            .optional()?;
        Ok(shift)
    }

    pub fn insert(&self, draft: &ShiftDraft) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO shifts (line_id, name, start_time, end_time, shift_quantity, operator, duration)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                draft.line_id,
                draft.name,
                draft.start_time.format(DB_TIME_FORMAT).to_string(),
                draft.end_time.format(DB_TIME_FORMAT).to_string(),
                draft.shift_quantity,
                draft.operator,
                draft.duration,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn update(&self, id: i64, draft: &ShiftDraft) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE shifts
            SET line_id = ?1, name = ?2, start_time = ?3, end_time = ?4,
                shift_quantity = ?5, operator = ?6, duration = ?7
            WHERE id = ?8
            "#,
            params![
                draft.line_id,
                draft.name,
                draft.start_time.format(DB_TIME_FORMAT).to_string(),
                draft.end_time.format(DB_TIME_FORMAT).to_string(),
                draft.shift_quantity,
                draft.operator,
                draft.duration,
                id,
            ],
        )?;
        Ok(affected)
    }

    pub fn delete(&self, id: i64) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM shifts WHERE id = ?1", params![id])?;
        Ok(affected)
    }
}
