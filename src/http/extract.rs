// ==========================================
// MES 后端 - 调用方身份提取
// ==========================================
// 规则:
// - 无 Authorization 头 → 匿名调用方
// - Bearer 令牌无效或过期 → 401
// ==========================================

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::api::error::{ApiError, ApiResult};
use crate::app::AppState;
use crate::auth::policy::{Action, Principal, Resource};

const BEARER_PREFIX: &str = "Bearer ";

/// 当前请求的调用方（可能匿名）
#[derive(Debug, Clone)]
pub struct Caller(pub Option<Principal>);

impl Caller {
    /// 按访问策略检查 (动作, 资源)
    pub fn authorize(&self, state: &AppState, action: Action, resource: Resource) -> ApiResult<()> {
        let decision = state.policy.authorize(self.0.as_ref(), action, resource);
        if !decision.is_allowed() {
            tracing::debug!(?action, ?resource, ?decision, "访问被拒绝");
        }
        decision.into()
    }

    /// 检查权限并返回已认证的调用方
    pub fn require(
        self,
        state: &AppState,
        action: Action,
        resource: Resource,
    ) -> ApiResult<Principal> {
        self.authorize(state, action, resource)?;
        self.0
            .ok_or_else(|| ApiError::Unauthorized("需要登录".to_string()))
    }
}

impl FromRequestParts<Arc<AppState>> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Some(raw) = parts.headers.get(AUTHORIZATION) else {
            return Ok(Caller(None));
        };
        let raw = raw
            .to_str()
            .map_err(|_| ApiError::Unauthorized("Authorization 头不是合法文本".to_string()))?;
        let token = raw
            .strip_prefix(BEARER_PREFIX)
            .or_else(|| raw.strip_prefix("bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::Unauthorized("需要 Bearer 令牌".to_string()))?;

        let principal = state.token_service.authenticate(token)?;
        Ok(Caller(Some(principal)))
    }
}
