// ==========================================
// MES 后端 - 产品数据仓储
// ==========================================

use crate::db::SharedConnection;
use crate::domain::product::Product;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sql_utils::{format_ts, get_ts};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::MutexGuard;

#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    pub name: String,
    pub description: Option<String>,
    pub status: String,
}

const SELECT_COLUMNS: &str =
    "SELECT id, name, description, status, created_at, updated_at FROM products";

pub struct ProductRepository {
    conn: SharedConnection,
}

impl ProductRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> SqliteResult<Product> {
        Ok(Product {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            status: row.get(3)?,
            created_at: get_ts(row, 4)?,
            updated_at: get_ts(row, 5)?,
        })
    }

    pub fn list_all(&self) -> RepositoryResult<Vec<Product>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!("{} ORDER BY id ASC", SELECT_COLUMNS))?;
        let products = stmt
            .query_map([], Self::map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(products)
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Product>> {
        let conn = self.get_conn()?;
        let product = conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                params![id],
                Self::map_row,
            )
            .optional()?;
        Ok(product)
    }

    pub fn insert(&self, draft: &ProductDraft) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let now = format_ts(&Utc::now());
        conn.execute(
            r#"
            INSERT INTO products (name, description, status, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            "#,
            params![draft.name, draft.description, draft.status, now],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn update(&self, id: i64, draft: &ProductDraft) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE products
            SET name = ?1, description = ?2, status = ?3, updated_at = ?4
            WHERE id = ?5
            "#,
            params![
                draft.name,
                draft.description,
                draft.status,
                format_ts(&Utc::now()),
                id,
            ],
        )?;
        Ok(affected)
    }

    pub fn delete(&self, id: i64) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM products WHERE id = ?1", params![id])?;
        Ok(affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_product_crud() {
        let conn = crate::db::open_in_memory().unwrap();
        let repo = ProductRepository::new(Arc::new(Mutex::new(conn)));

        let id = repo
            .insert(&ProductDraft {
                name: "Gear".to_string(),
                description: Some("18T".to_string()),
                status: "Active".to_string(),
            })
            .unwrap();
        let product = repo.find_by_id(id).unwrap().unwrap();
        assert_eq!(product.name, "Gear");
        assert!(product.updated_at >= product.created_at);

        assert_eq!(
            repo.update(
                id,
                &ProductDraft {
                    name: "Gear v2".to_string(),
                    description: None,
                    status: "Inactive".to_string(),
                }
            )
            .unwrap(),
            1
        );
        assert_eq!(repo.find_by_id(id).unwrap().unwrap().status, "Inactive");
        assert_eq!(repo.update(999, &ProductDraft {
            name: "x".to_string(),
            description: None,
            status: "Active".to_string(),
        }).unwrap(), 0);
        assert_eq!(repo.delete(id).unwrap(), 1);
    }
}
