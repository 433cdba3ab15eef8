// ==========================================
// MES 后端 - 工单数据仓储
// ==========================================

use crate::db::SharedConnection;
use crate::domain::work_order::{WorkOrder, WORK_ORDER_STATUS_COMPLETED};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sql_utils::{format_ts, get_date_opt, get_ts, DB_DATE_FORMAT};
use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::MutexGuard;

/// 工单写入数据
#[derive(Debug, Clone, PartialEq)]
pub struct WorkOrderDraft {
    pub product_id: i64,
    pub quantity: i64,
    pub status: String,
    pub due_date: Option<NaiveDate>,
    pub assigned_line_id: Option<i64>,
    pub progress: f64,
    pub alarms: i64,
}

/// 工单更新结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkOrderUpdate {
    Updated,
    NotFound,
    /// 工单已完成，拒绝回退
    Rejected { current_status: String },
}

const SELECT_COLUMNS: &str = "SELECT id, product_id, quantity, status, due_date, assigned_line_id, progress, alarms, created_at, updated_at FROM work_orders";

pub struct WorkOrderRepository {
    conn: SharedConnection,
}

impl WorkOrderRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> SqliteResult<WorkOrder> {
        Ok(WorkOrder {
            id: row.get(0)?,
            product_id: row.get(1)?,
            quantity: row.get(2)?,
            status: row.get(3)?,
            due_date: get_date_opt(row, 4)?,
            assigned_line_id: row.get(5)?,
            progress: row.get(6)?,
            alarms: row.get(7)?,
            created_at: get_ts(row, 8)?,
            updated_at: get_ts(row, 9)?,
        })
    }

    pub fn list_all(&self) -> RepositoryResult<Vec<WorkOrder>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!("{} ORDER BY id ASC", SELECT_COLUMNS))?;
        let orders = stmt
            .query_map([], Self::map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(orders)
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<WorkOrder>> {
        let conn = self.get_conn()?;
        let order = conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                params![id],
                Self::map_row,
            )
            .optional()?;
        Ok(order)
    }

    /// 新增工单（created_at/updated_at 取当前时间）
    pub fn insert(&self, draft: &WorkOrderDraft) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let now = format_ts(&Utc::now());
        conn.execute(
            r#"
            INSERT INTO work_orders
                (product_id, quantity, status, due_date, assigned_line_id, progress, alarms, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
            "#,
            params![
                draft.product_id,
                draft.quantity,
                draft.status,
                draft.due_date.map(|d| d.format(DB_DATE_FORMAT).to_string()),
                draft.assigned_line_id,
                draft.progress,
                draft.alarms,
                now,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 整体更新工单（刷新 updated_at）
    ///
    /// 已完成工单只接受仍为已完成的写入；判定与写入在同一把锁内完成
    pub fn update_unless_completed(
        &self,
        id: i64,
        draft: &WorkOrderDraft,
    ) -> RepositoryResult<WorkOrderUpdate> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE work_orders
            SET product_id = ?1, quantity = ?2, status = ?3, due_date = ?4,
                assigned_line_id = ?5, progress = ?6, alarms = ?7, updated_at = ?8
            WHERE id = ?9 AND (status != ?10 OR ?3 = ?10)
            "#,
            params![
                draft.product_id,
                draft.quantity,
                draft.status,
                draft.due_date.map(|d| d.format(DB_DATE_FORMAT).to_string()),
                draft.assigned_line_id,
                draft.progress,
                draft.alarms,
                format_ts(&Utc::now()),
                id,
                WORK_ORDER_STATUS_COMPLETED,
            ],
        )?;
        if affected > 0 {
            return Ok(WorkOrderUpdate::Updated);
        }

        let current: Option<String> = conn
            .query_row(
                "SELECT status FROM work_orders WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(match current {
            Some(status) => WorkOrderUpdate::Rejected { current_status: status },
            None => WorkOrderUpdate::NotFound,
        })
    }

    pub fn delete(&self, id: i64) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM work_orders WHERE id = ?1", params![id])?;
        Ok(affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::product_repo::{ProductDraft, ProductRepository};
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_work_order_crud() {
        let conn = Arc::new(Mutex::new(crate::db::open_in_memory().unwrap()));
        let products = ProductRepository::new(conn.clone());
        let product_id = products
            .insert(&ProductDraft {
                name: "Bracket".to_string(),
                description: None,
                status: "Active".to_string(),
            })
            .unwrap();

        let repo = WorkOrderRepository::new(conn);
        let mut draft = WorkOrderDraft {
            product_id,
            quantity: 500,
            status: "Pending".to_string(),
            due_date: NaiveDate::from_ymd_opt(2025, 6, 1),
            assigned_line_id: None,
            progress: 0.0,
            alarms: 0,
        };
        let id = repo.insert(&draft).unwrap();
        let order = repo.find_by_id(id).unwrap().unwrap();
        assert_eq!(order.quantity, 500);
        assert_eq!(order.due_date, NaiveDate::from_ymd_opt(2025, 6, 1));

        draft.progress = 0.5;
        draft.status = "InProgress".to_string();
        assert_eq!(
            repo.update_unless_completed(id, &draft).unwrap(),
            WorkOrderUpdate::Updated
        );
        let order = repo.find_by_id(id).unwrap().unwrap();
        assert_eq!(order.progress, 0.5);

        assert_eq!(repo.delete(id).unwrap(), 1);
        assert!(repo.list_all().unwrap().is_empty());
    }

    #[test]
    fn test_completed_order_rejects_revert_in_one_call() {
        let conn = Arc::new(Mutex::new(crate::db::open_in_memory().unwrap()));
        let product_id = ProductRepository::new(conn.clone())
            .insert(&ProductDraft {
                name: "Bracket".to_string(),
                description: None,
                status: "Active".to_string(),
            })
            .unwrap();
        let repo = WorkOrderRepository::new(conn);
        let mut draft = WorkOrderDraft {
            product_id,
            quantity: 10,
            status: WORK_ORDER_STATUS_COMPLETED.to_string(),
            due_date: None,
            assigned_line_id: None,
            progress: 1.0,
            alarms: 0,
        };
        let id = repo.insert(&draft).unwrap();

        draft.status = "Pending".to_string();
        draft.progress = 0.0;
        assert_eq!(
            repo.update_unless_completed(id, &draft).unwrap(),
            WorkOrderUpdate::Rejected {
                current_status: WORK_ORDER_STATUS_COMPLETED.to_string()
            }
        );
        let order = repo.find_by_id(id).unwrap().unwrap();
        assert_eq!(order.status, WORK_ORDER_STATUS_COMPLETED);
        assert_eq!(order.progress, 1.0);

        assert_eq!(
            repo.update_unless_completed(id + 1, &draft).unwrap(),
            WorkOrderUpdate::NotFound
        );
    }

    #[test]
    fn test_work_order_requires_product() {
        let conn = Arc::new(Mutex::new(crate::db::open_in_memory().unwrap()));
        let repo = WorkOrderRepository::new(conn);
        let err = repo
            .insert(&WorkOrderDraft {
                product_id: 42,
                quantity: 1,
                status: "Pending".to_string(),
                due_date: None,
                assigned_line_id: None,
                progress: 0.0,
                alarms: 0,
            })
            .unwrap_err();
        assert!(matches!(err, RepositoryError::ForeignKeyViolation(_)));
    }
}
