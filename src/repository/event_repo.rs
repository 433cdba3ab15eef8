// ==========================================
// MES 后端 - 设备事件仓储
// ==========================================

use crate::db::SharedConnection;
use crate::domain::alarm::MachineEvent;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sql_utils::{format_ts, get_ts};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::MutexGuard;

#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    pub machine_id: i64,
    pub work_order_id: Option<i64>,
    pub event_type: String,
    pub description: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

const SELECT_COLUMNS: &str =
    "SELECT id, machine_id, work_order_id, event_type, description, occurred_at FROM events";

pub struct EventRepository {
    conn: SharedConnection,
}

impl EventRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> SqliteResult<MachineEvent> {
        Ok(MachineEvent {
            id: row.get(0)?,
            machine_id: row.get(1)?,
            work_order_id: row.get(2)?,
            event_type: row.get(3)?,
            description: row.get(4)?,
            occurred_at: get_ts(row, 5)?,
        })
    }

    pub fn list_all(&self) -> RepositoryResult<Vec<MachineEvent>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare(&format!("{} ORDER BY occurred_at DESC, id DESC", SELECT_COLUMNS))?;
        let events = stmt
            .query_map([], Self::map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(events)
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<MachineEvent>> {
        let conn = self.get_conn()?;
        let event = conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                params![id],
                Self::map_row,
            )
            .optional()?;
        Ok(event)
    }

    pub fn insert(&self, draft: &EventDraft) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO events (machine_id, work_order_id, event_type, description, occurred_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                draft.machine_id,
                draft.work_order_id,
                draft.event_type,
                draft.description,
                format_ts(&draft.occurred_at),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn update(&self, id: i64, draft: &EventDraft) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE events
            SET machine_id = ?1, work_order_id = ?2, event_type = ?3, description = ?4, occurred_at = ?5
            WHERE id = ?6
            "#,
            params![
                draft.machine_id,
                draft.work_order_id,
                draft.event_type,
                draft.description,
                format_ts(&draft.occurred_at),
                id,
            ],
        )?;
        Ok(affected)
    }

    pub fn delete(&self, id: i64) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM events WHERE id = ?1", params![id])?;
        Ok(affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{CounterType, MachineStatus};
    use crate::repository::machine_repo::{MachineDraft, MachineRepository};
    use chrono::TimeZone;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_events_listed_newest_first() {
        let conn = Arc::new(Mutex::new(crate::db::open_in_memory().unwrap()));
        let machine_id = MachineRepository::new(conn.clone())
            .insert(&MachineDraft {
                name: "M1".to_string(),
                line_id: None,
                status: MachineStatus::Running,
                machine_type: None,
                counter_type: CounterType::Status,
                avg_pieces_per_sec: None,
                product_id: None,
            })
            .unwrap();
        let repo = EventRepository::new(conn);

        for (hour, kind) in [(8, "START"), (9, "STOP")] {
            repo.insert(&EventDraft {
                machine_id,
                work_order_id: None,
                event_type: kind.to_string(),
                description: None,
                occurred_at: Utc.with_ymd_and_hms(2025, 2, 1, hour, 0, 0).unwrap(),
            })
            .unwrap();
        }

        let events = repo.list_all().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, "STOP");
    }
}
