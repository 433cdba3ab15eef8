// ==========================================
// MES 后端 - 用户管理 API
// ==========================================
// 职责: 用户 CRUD、个人资料修改、初始管理员
// 约束: 明文密码只在本层出现，入库前一律哈希；响应体不含哈希
// ==========================================

use std::sync::Arc;

use serde::Deserialize;

use crate::api::error::{ApiError, ApiResult};
use crate::api::input::{non_empty_string, require_text};
use crate::auth::password::hash_password;
use crate::auth::policy::Principal;
use crate::domain::types::Role;
use crate::domain::user::{User, USER_STATUS_ACTIVE};
use crate::repository::error::RepositoryError;
use crate::repository::user_repo::{NewUser, UserPatch, UserRepository};

/// 局部更新的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    Updated,
    /// 请求中没有可更新的字段
    NoChanges,
}

pub struct UserApi {
    user_repo: Arc<UserRepository>,
}

impl UserApi {
    pub fn new(user_repo: Arc<UserRepository>) -> Self {
        Self { user_repo }
    }

    pub fn list_users(&self) -> ApiResult<Vec<User>> {
        Ok(self.user_repo.list_all()?)
    }

    pub fn get_user(&self, user_id: i64) -> ApiResult<User> {
        self.user_repo
            .find_by_id(user_id)?
            .ok_or_else(|| RepositoryError::not_found("User", user_id).into())
    }

    /// 新增用户
    ///
    /// # 返回
    /// - Err(ApiError::InvalidInput): 缺少密码或必填字段、角色未知
    /// - Err(ApiError::BusinessRuleViolation): 用户名或邮箱重复
    pub fn create_user(&self, input: CreateUserInput) -> ApiResult<i64> {
        let password = input
            .password
            .ok_or_else(|| ApiError::InvalidInput("password is required".to_string()))?;
        let user = NewUser {
            full_name: require_text("full_name", &input.full_name)?,
            username: require_text("username", &input.username)?,
            password_hash: hash_password(&password)?,
            email: require_text("email", &input.email)?,
            role: parse_role(&input.role)?,
            status: input
                .status
                .unwrap_or_else(|| USER_STATUS_ACTIVE.to_string()),
        };

        let id = self.user_repo.insert(&user).map_err(duplicate_user)?;
        tracing::info!(user_id = id, username = %user.username, role = %user.role, "用户已创建");
        Ok(id)
    }

    /// 管理员修改用户（只更新非空字段）
    pub fn update_user(&self, user_id: i64, input: UpdateUserInput) -> ApiResult<PatchOutcome> {
        let patch = UserPatch {
            full_name: input.full_name,
            username: input.username,
            password_hash: input.password.as_deref().map(hash_password).transpose()?,
            email: input.email,
            role: input.role.as_deref().map(parse_role).transpose()?,
            status: input.status,
        };
        self.apply_patch(user_id, &patch)
    }

    /// 当前用户修改自己的资料
    pub fn update_profile(&self, principal: &Principal, input: ProfileInput) -> ApiResult<PatchOutcome> {
        let patch = UserPatch {
            full_name: input.full_name,
            username: input.username,
            password_hash: input.password.as_deref().map(hash_password).transpose()?,
            email: input.email,
            ..Default::default()
        };
        self.apply_patch(principal.user_id, &patch)
    }

    pub fn delete_user(&self, user_id: i64) -> ApiResult<()> {
        if self.user_repo.delete(user_id)? == 0 {
            return Err(RepositoryError::not_found("User", user_id).into());
        }
        tracing::info!(user_id, "用户已删除");
        Ok(())
    }

    /// 用户表为空时创建初始管理员
    ///
    /// # 返回
    /// - Ok(Some(id)): 已创建
    /// - Ok(None): 已有用户，未做任何修改
    pub fn ensure_bootstrap_admin(&self, username: &str, password: &str) -> ApiResult<Option<i64>> {
        if self.user_repo.count()? > 0 {
            return Ok(None);
        }
        let id = self.user_repo.insert(&NewUser {
            full_name: "Administrator".to_string(),
            username: username.to_string(),
            password_hash: hash_password(password)?,
            email: format!("{}@localhost", username),
            role: Role::Admin,
            status: USER_STATUS_ACTIVE.to_string(),
        })?;
        tracing::warn!(user_id = id, username, "已创建初始管理员，请尽快修改密码");
        Ok(Some(id))
    }

    fn apply_patch(&self, user_id: i64, patch: &UserPatch) -> ApiResult<PatchOutcome> {
        let affected = self
            .user_repo
            .update_fields(user_id, patch)
            .map_err(duplicate_user)?;
        if affected == 0 {
            return Err(RepositoryError::not_found("User", user_id).into());
        }
        Ok(if patch.is_empty() {
            PatchOutcome::NoChanges
        } else {
            PatchOutcome::Updated
        })
    }
}

/// 唯一约束冲突 → 400（用户名或邮箱重复）
fn duplicate_user(err: RepositoryError) -> ApiError {
    match err {
        RepositoryError::UniqueConstraintViolation(_) => ApiError::BusinessRuleViolation(
            "A user with this username or email already exists".to_string(),
        ),
        other => other.into(),
    }
}

fn parse_role(raw: &str) -> ApiResult<Role> {
    Role::from_db_str(raw).ok_or_else(|| ApiError::InvalidInput(format!("unknown role: {}", raw)))
}

// ==========================================
// DTO 类型定义
// ==========================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateUserInput {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub password: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub status: Option<String>,
}

/// 管理员修改用户；空字段保持原值
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserInput {
    #[serde(default, deserialize_with = "non_empty_string")]
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub password: Option<String>,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub status: Option<String>,
}

/// 个人资料修改；空字段保持原值
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileInput {
    #[serde(default, deserialize_with = "non_empty_string")]
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub password: Option<String>,
}
