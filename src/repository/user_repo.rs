// ==========================================
// MES 后端 - 用户数据仓储
// ==========================================
// 约束: password_hash 只在仓储层与认证层之间流转，不进入响应体
// ==========================================

use crate::db::SharedConnection;
use crate::domain::types::Role;
use crate::domain::user::User;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sql_utils::get_ts;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::MutexGuard;

/// 新用户
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub full_name: String,
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub role: Role,
    pub status: String,
}

/// 用户局部更新（None 表示保持原值）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPatch {
    pub full_name: Option<String>,
    pub username: Option<String>,
    pub password_hash: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub status: Option<String>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.username.is_none()
            && self.password_hash.is_none()
            && self.email.is_none()
            && self.role.is_none()
            && self.status.is_none()
    }
}

const SELECT_COLUMNS: &str =
    "SELECT id, full_name, username, password_hash, email, role, status, created_at FROM users";

pub struct UserRepository {
    conn: SharedConnection,
}

impl UserRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> SqliteResult<User> {
        let raw_role: String = row.get(5)?;
        let role = Role::from_db_str(&raw_role).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                5,
                Type::Text,
                format!("未知角色: {}", raw_role).into(),
            )
        })?;
        Ok(User {
            id: row.get(0)?,
            full_name: row.get(1)?,
            username: row.get(2)?,
            password_hash: row.get(3)?,
            email: row.get(4)?,
            role,
            status: row.get(6)?,
            created_at: get_ts(row, 7)?,
        })
    }

    pub fn list_all(&self) -> RepositoryResult<Vec<User>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!("{} ORDER BY id ASC", SELECT_COLUMNS))?;
        let users = stmt
            .query_map([], Self::map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(users)
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<User>> {
        let conn = self.get_conn()?;
        let user = conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                params![id],
                Self::map_row,
            )
            .optional()?;
        Ok(user)
    }

    pub fn find_by_username(&self, username: &str) -> RepositoryResult<Option<User>> {
        let conn = self.get_conn()?;
        let user = conn
            .query_row(
                &format!("{} WHERE username = ?1", SELECT_COLUMNS),
                params![username],
                Self::map_row,
            )
            .optional()?;
        Ok(user)
    }

    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn insert(&self, user: &NewUser) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO users (full_name, username, password_hash, email, role, status)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                user.full_name,
                user.username,
                user.password_hash,
                user.email,
                user.role.to_db_str(),
                user.status,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 局部更新：仅写入 patch 中给出的字段
    ///
    /// # 返回
    /// 受影响行数；patch 为空时不执行 SQL，返回记录是否存在（0/1）
    pub fn update_fields(&self, id: i64, patch: &UserPatch) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        if patch.is_empty() {
            let exists: Option<i64> = conn
                .query_row("SELECT 1 FROM users WHERE id = ?1", params![id], |row| row.get(0))
                .optional()?;
            return Ok(exists.map_or(0, |_| 1));
        }

        let affected = conn.execute(
            r#"
            UPDATE users
            SET full_name = COALESCE(?1, full_name),
                username = COALESCE(?2, username),
                password_hash = COALESCE(?3, password_hash),
                email = COALESCE(?4, email),
                role = COALESCE(?5, role),
                status = COALESCE(?6, status)
            WHERE id = ?7
            "#,
            params![
                patch.full_name,
                patch.username,
                patch.password_hash,
                patch.email,
                patch.role.map(|r| r.to_db_str()),
                patch.status,
                id,
            ],
        )?;
        Ok(affected)
    }

    pub fn delete(&self, id: i64) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM users WHERE id = ?1", params![id])?;
        Ok(affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn setup_repo() -> UserRepository {
        let conn = crate::db::open_in_memory().unwrap();
        UserRepository::new(Arc::new(Mutex::new(conn)))
    }

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            full_name: "Ada Admin".to_string(),
            username: username.to_string(),
            password_hash: "$2b$12$placeholderplaceholderplac".to_string(),
            email: email.to_string(),
            role: Role::Admin,
            status: "Active".to_string(),
        }
    }

    #[test]
    fn test_insert_and_find_by_username() {
        let repo = setup_repo();
        let id = repo.insert(&new_user("ada", "ada@example.com")).unwrap();
        let user = repo.find_by_username("ada").unwrap().unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.role, Role::Admin);
        assert!(repo.find_by_username("nobody").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_username_is_unique_violation() {
        let repo = setup_repo();
        repo.insert(&new_user("ada", "ada@example.com")).unwrap();
        let err = repo.insert(&new_user("ada", "other@example.com")).unwrap_err();
        assert!(matches!(err, RepositoryError::UniqueConstraintViolation(_)));
    }

    #[test]
    fn test_update_fields_keeps_missing_fields() {
        let repo = setup_repo();
        let id = repo.insert(&new_user("ada", "ada@example.com")).unwrap();

        let patch = UserPatch {
            role: Some(Role::Moderator),
            ..Default::default()
        };
        assert_eq!(repo.update_fields(id, &patch).unwrap(), 1);
        let user = repo.find_by_id(id).unwrap().unwrap();
        assert_eq!(user.role, Role::Moderator);
        assert_eq!(user.email, "ada@example.com");

        assert_eq!(repo.update_fields(id, &UserPatch::default()).unwrap(), 1);
        assert_eq!(repo.update_fields(999, &UserPatch::default()).unwrap(), 0);
    }
}
