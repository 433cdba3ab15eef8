// ==========================================
// MES 后端 - 产线数据仓储
// ==========================================
// 职责: production_lines CRUD + 批次/生产履历/告警计数查询
// ==========================================

use crate::db::SharedConnection;
use crate::domain::production_line::{Batch, ProductionHistoryEntry, ProductionLine};
use crate::domain::types::MachineStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sql_utils::get_ts;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::collections::HashMap;
use std::sync::MutexGuard;

/// 产线写入数据
#[derive(Debug, Clone, PartialEq)]
pub struct ProductionLineDraft {
    pub name: String,
    pub description: Option<String>,
    pub status: MachineStatus,
    pub shift_quantity: i64,
}

const SELECT_COLUMNS: &str =
    "SELECT id, name, description, status, shift_quantity, created_at FROM production_lines";

pub struct ProductionLineRepository {
    conn: SharedConnection,
}

impl ProductionLineRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> SqliteResult<ProductionLine> {
        Ok(ProductionLine {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            status: MachineStatus::from_db_str(&row.get::<_, String>(3)?),
            shift_quantity: row.get(4)?,
            created_at: get_ts(row, 5)?,
        })
    }

    pub fn list_all(&self) -> RepositoryResult<Vec<ProductionLine>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!("{} ORDER BY id ASC", SELECT_COLUMNS))?;
        let lines = stmt
            .query_map([], Self::map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(lines)
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<ProductionLine>> {
        let conn = self.get_conn()?;
        let line = conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                params![id],
                Self::map_row,
            )
            .optional()?;
        Ok(line)
    }

    pub fn insert(&self, draft: &ProductionLineDraft) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO production_lines (name, description, status, shift_quantity)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                draft.name,
                draft.description,
                draft.status.to_db_str(),
                draft.shift_quantity,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn update(&self, id: i64, draft: &ProductionLineDraft) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE production_lines
            SET name = ?1, description = ?2, status = ?3, shift_quantity = ?4
            WHERE id = ?5
            "#,
            params![
                draft.name,
                draft.description,
                draft.status.to_db_str(),
                draft.shift_quantity,
                id,
            ],
        )?;
        Ok(affected)
    }

    pub fn delete(&self, id: i64) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM production_lines WHERE id = ?1", params![id])?;
        Ok(affected)
    }

    // ==========================================
    // 汇总查询
    // ==========================================

    /// 按产线统计下属设备的告警数（无告警的产线不出现在结果中）
    pub fn count_alarms_by_line(&self) -> RepositoryResult<HashMap<i64, i64>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT m.line_id, COUNT(*)
            FROM alarms a
            JOIN machines m ON m.id = a.machine_id
            WHERE m.line_id IS NOT NULL
            GROUP BY m.line_id
            "#,
        )?;
        let counts = stmt
            .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)))?
            .collect::<SqliteResult<HashMap<_, _>>>()?;
        Ok(counts)
    }

    /// 最新批次
    pub fn find_latest_batch(&self, line_id: i64) -> RepositoryResult<Option<Batch>> {
        let conn = self.get_conn()?;
        let batch = conn
            .query_row(
                r#"
                SELECT id, name, "current", target, elapsed
                FROM batches
                WHERE line_id = ?1
                ORDER BY id DESC
                LIMIT 1
                "#,
                params![line_id],
                |row| {
                    Ok(Batch {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        current: row.get(2)?,
                        target: row.get(3)?,
                        elapsed: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(batch)
    }

    /// 最近 limit 条生产履历（新的在前）
    pub fn list_history(
        &self,
        line_id: i64,
        limit: usize,
    ) -> RepositoryResult<Vec<ProductionHistoryEntry>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT code, label, qty
            FROM production_history
            WHERE line_id = ?1
            ORDER BY id DESC
            LIMIT ?2
            "#,
        )?;
        let history = stmt
            .query_map(params![line_id, limit as i64], |row| {
                Ok(ProductionHistoryEntry {
                    code: row.get(0)?,
                    label: row.get(1)?,
                    qty: row.get(2)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(history)
    }

    pub fn insert_batch(
        &self,
        line_id: i64,
        name: &str,
        current: i64,
        target: i64,
        elapsed: Option<&str>,
    ) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO batches (line_id, name, "current", target, elapsed)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![line_id, name, current, target, elapsed],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn insert_history(
        &self,
        line_id: i64,
        entry: &ProductionHistoryEntry,
    ) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO production_history (line_id, code, label, qty) VALUES (?1, ?2, ?3, ?4)",
            params![line_id, entry.code, entry.label, entry.qty],
        )?;
        Ok(conn.last_insert_rowid())
    }
}
