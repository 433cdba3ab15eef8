// ==========================================
// MES 后端 - 登录 API
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::auth::password::verify_password;
use crate::auth::policy::Principal;
use crate::auth::token::TokenService;
use crate::domain::types::Role;
use crate::repository::user_repo::UserRepository;

pub const TOKEN_TYPE_BEARER: &str = "bearer";

pub struct AuthApi {
    user_repo: Arc<UserRepository>,
    token_service: Arc<TokenService>,
}

impl AuthApi {
    pub fn new(user_repo: Arc<UserRepository>, token_service: Arc<TokenService>) -> Self {
        Self {
            user_repo,
            token_service,
        }
    }

    /// 用户名密码登录
    ///
    /// # 返回
    /// - Err(ApiError::InvalidInput): 用户名或密码错误（不区分两者）
    /// - Err(ApiError::Forbidden): 用户已被封禁
    pub fn login(&self, username: &str, password: &str) -> ApiResult<LoginResponse> {
        let user = match self.user_repo.find_by_username(username.trim())? {
            Some(user) if verify_password(password, &user.password_hash) => user,
            _ => {
                tracing::warn!(username, "登录失败");
                return Err(ApiError::InvalidInput(
                    "Incorrect username or password".to_string(),
                ));
            }
        };
        if user.is_banned() {
            tracing::warn!(user_id = user.id, "已封禁用户尝试登录");
            return Err(ApiError::Forbidden("User is banned".to_string()));
        }

        let principal = Principal {
            user_id: user.id,
            username: user.username.clone(),
            role: user.role,
        };
        let access_token = self.token_service.issue(&principal)?;
        tracing::info!(user_id = user.id, role = %user.role, "登录成功");

        Ok(LoginResponse {
            access_token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            user: LoginUser {
                id: user.id,
                username: user.username,
                role: user.role,
                email: user.email,
                full_name: user.full_name,
            },
        })
    }
}

/// 登录表单
#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub user: LoginUser,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginUser {
    pub id: i64,
    pub username: String,
    pub role: Role,
    pub email: String,
    pub full_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::hash_password;
    use crate::db::open_in_memory;
    use crate::domain::user::{USER_STATUS_ACTIVE, USER_STATUS_BANNED};
    use crate::repository::user_repo::NewUser;
    use std::sync::{Arc, Mutex};

    fn setup() -> (AuthApi, Arc<TokenService>) {
        let conn = Arc::new(Mutex::new(open_in_memory().unwrap()));
        let repo = Arc::new(UserRepository::new(conn));
        for (name, status) in [("alice", USER_STATUS_ACTIVE), ("bob", USER_STATUS_BANNED)] {
            repo.insert(&NewUser {
                full_name: name.to_uppercase(),
                username: name.to_string(),
                password_hash: hash_password("pw").unwrap(),
                email: format!("{}@example.com", name),
                role: Role::Moderator,
                status: status.to_string(),
            })
            .unwrap();
        }
        let tokens = Arc::new(TokenService::new("test-secret", 30));
        (AuthApi::new(repo, tokens.clone()), tokens)
    }

    #[test]
    fn test_login_issues_verifiable_token() {
        let (api, tokens) = setup();
        let resp = api.login("alice", "pw").unwrap();
        assert_eq!(resp.token_type, "bearer");
        assert_eq!(resp.user.username, "alice");
        assert_eq!(resp.user.role, Role::Moderator);

        let principal = tokens.authenticate(&resp.access_token).unwrap();
        assert_eq!(principal.user_id, resp.user.id);
        assert_eq!(principal.role, Role::Moderator);
    }

    #[test]
    fn test_bad_credentials_are_invalid_input() {
        let (api, _) = setup();
        assert_eq!(api.login("alice", "wrong").unwrap_err().code(), "INVALID_INPUT");
        assert_eq!(api.login("nobody", "pw").unwrap_err().code(), "INVALID_INPUT");
    }

    #[test]
    fn test_banned_user_is_forbidden() {
        let (api, _) = setup();
        assert_eq!(api.login("bob", "pw").unwrap_err().code(), "FORBIDDEN");
    }
}
