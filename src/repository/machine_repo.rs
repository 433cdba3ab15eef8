// ==========================================
// MES 后端 - 设备数据仓储
// ==========================================
// 约束: Repository 不含业务逻辑，所有查询参数化
// ==========================================

use crate::db::SharedConnection;
use crate::domain::machine::Machine;
use crate::domain::types::{CounterType, MachineStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::MutexGuard;

/// 设备写入数据（新增/整体更新）
#[derive(Debug, Clone, PartialEq)]
pub struct MachineDraft {
    pub name: String,
    pub line_id: Option<i64>,
    pub status: MachineStatus,
    pub machine_type: Option<String>,
    pub counter_type: CounterType,
    pub avg_pieces_per_sec: Option<f64>,
    pub product_id: Option<i64>,
}

const SELECT_COLUMNS: &str =
    "SELECT id, name, line_id, status, type, counter_type, avg_pieces_per_sec, product_id FROM machines";

// ==========================================
// MachineRepository - 设备仓储
// ==========================================
pub struct MachineRepository {
    conn: SharedConnection,
}

impl MachineRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> SqliteResult<Machine> {
        Ok(Machine {
            id: row.get(0)?,
            name: row.get(1)?,
            line_id: row.get(2)?,
            status: MachineStatus::from_db_str(&row.get::<_, String>(3)?),
            machine_type: row.get(4)?,
            counter_type: CounterType::from_db_str(&row.get::<_, String>(5)?),
            avg_pieces_per_sec: row.get(6)?,
            product_id: row.get(7)?,
        })
    }

    /// 查询全部设备
    pub fn list_all(&self) -> RepositoryResult<Vec<Machine>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!("{} ORDER BY id ASC", SELECT_COLUMNS))?;
        let machines = stmt
            .query_map([], Self::map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(machines)
    }

    /// 查询产线下属设备
    pub fn list_by_line(&self, line_id: i64) -> RepositoryResult<Vec<Machine>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare(&format!("{} WHERE line_id = ?1 ORDER BY id ASC", SELECT_COLUMNS))?;
        let machines = stmt
            .query_map(params![line_id], Self::map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(machines)
    }

    /// 按主键查询
    ///
    /// # 返回
    /// - Ok(Some(Machine)): 找到设备
    /// - Ok(None): 未找到
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Machine>> {
        let conn = self.get_conn()?;
        let machine = conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                params![id],
                Self::map_row,
            )
            .optional()?;
        Ok(machine)
    }

    /// 新增设备，返回自增ID
    pub fn insert(&self, draft: &MachineDraft) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO machines (name, line_id, status, type, counter_type, avg_pieces_per_sec, product_id)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                draft.name,
                draft.line_id,
                draft.status.to_db_str(),
                draft.machine_type,
                draft.counter_type.to_db_str(),
                draft.avg_pieces_per_sec,
                draft.product_id,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 整体更新设备，返回受影响行数
    pub fn update(&self, id: i64, draft: &MachineDraft) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE machines
            SET name = ?1, line_id = ?2, status = ?3, type = ?4,
                counter_type = ?5, avg_pieces_per_sec = ?6, product_id = ?7
            WHERE id = ?8
            "#,
            params![
                draft.name,
                draft.line_id,
                draft.status.to_db_str(),
                draft.machine_type,
                draft.counter_type.to_db_str(),
                draft.avg_pieces_per_sec,
                draft.product_id,
                id,
            ],
        )?;
        Ok(affected)
    }

    /// 删除设备，返回受影响行数
    pub fn delete(&self, id: i64) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM machines WHERE id = ?1", params![id])?;
        Ok(affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn setup_repo() -> MachineRepository {
        let conn = crate::db::open_in_memory().unwrap();
        MachineRepository::new(Arc::new(Mutex::new(conn)))
    }

    fn draft(name: &str, counter_type: CounterType, rate: Option<f64>) -> MachineDraft {
        MachineDraft {
            name: name.to_string(),
            line_id: None,
            status: MachineStatus::Running,
            machine_type: Some("Press".to_string()),
            counter_type,
            avg_pieces_per_sec: rate,
            product_id: None,
        }
    }

    #[test]
    fn test_insert_and_find_by_id() {
        let repo = setup_repo();
        let id = repo.insert(&draft("M1", CounterType::Counter, Some(2.0))).unwrap();

        let found = repo.find_by_id(id).unwrap().expect("设备应存在");
        assert_eq!(found.name, "M1");
        assert_eq!(found.counter_type, CounterType::Counter);
        assert_eq!(found.avg_pieces_per_sec, Some(2.0));
        assert_eq!(found.status, MachineStatus::Running);
    }

    #[test]
    fn test_update_and_delete() {
        let repo = setup_repo();
        let id = repo.insert(&draft("M1", CounterType::Status, None)).unwrap();

        let mut changed = draft("M1-renamed", CounterType::Status, None);
        changed.status = MachineStatus::Stopped;
        assert_eq!(repo.update(id, &changed).unwrap(), 1);
        let found = repo.find_by_id(id).unwrap().unwrap();
        assert_eq!(found.name, "M1-renamed");
        assert_eq!(found.status, MachineStatus::Stopped);

        assert_eq!(repo.delete(id).unwrap(), 1);
        assert!(repo.find_by_id(id).unwrap().is_none());
        assert_eq!(repo.delete(id).unwrap(), 0);
    }

    #[test]
    fn test_list_all_ordered() {
        let repo = setup_repo();
        repo.insert(&draft("A", CounterType::Status, None)).unwrap();
        repo.insert(&draft("B", CounterType::Status, None)).unwrap();
        let names: Vec<String> = repo.list_all().unwrap().into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["A".to_string(), "B".to_string()]);
    }
}
