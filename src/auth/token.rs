// ==========================================
// MES 后端 - 访问令牌 (JWT, HS256)
// ==========================================

use crate::auth::policy::Principal;
use crate::domain::types::Role;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 令牌有效期上限（分钟），一年
pub const MAX_TOKEN_TTL_MINUTES: i64 = 60 * 24 * 365;

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("令牌签发失败: {0}")]
    Issue(String),

    #[error("令牌无效: {0}")]
    Invalid(String),

    #[error("令牌中的角色未知: {0}")]
    UnknownRole(String),
}

/// 令牌载荷
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// 用户名
    pub sub: String,
    /// 用户ID
    pub uid: i64,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn to_principal(&self) -> Result<Principal, TokenError> {
        let role =
            Role::from_db_str(&self.role).ok_or_else(|| TokenError::UnknownRole(self.role.clone()))?;
        Ok(Principal {
            user_id: self.uid,
            username: self.sub.clone(),
            role,
        })
    }
}

/// 令牌签发/校验器
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    /// ttl_minutes 超出 ±MAX_TOKEN_TTL_MINUTES 时按上限截断
    pub fn new(secret: &str, ttl_minutes: i64) -> Self {
        let ttl_minutes = ttl_minutes.clamp(-MAX_TOKEN_TTL_MINUTES, MAX_TOKEN_TTL_MINUTES);
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::minutes(ttl_minutes),
        }
    }

    pub fn issue(&self, principal: &Principal) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: principal.username.clone(),
            uid: principal.user_id,
            role: principal.role.to_db_str().to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Issue(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "iat"]);
        validation.validate_exp = true;
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| TokenError::Invalid(e.to_string()))
    }

    /// 校验并转换为调用方身份
    pub fn authenticate(&self, token: &str) -> Result<Principal, TokenError> {
        self.verify(token)?.to_principal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal() -> Principal {
        Principal {
            user_id: 7,
            username: "ada".to_string(),
            role: Role::Moderator,
        }
    }

    #[test]
    fn test_issue_and_authenticate() {
        let service = TokenService::new("secret", 60);
        let token = service.issue(&principal()).unwrap();
        assert_eq!(service.authenticate(&token).unwrap(), principal());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = TokenService::new("secret", 60).issue(&principal()).unwrap();
        let err = TokenService::new("other", 60).verify(&token).unwrap_err();
        assert!(matches!(err, TokenError::Invalid(_)));
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = TokenService::new("secret", -5);
        let token = service.issue(&principal()).unwrap();
        assert!(service.verify(&token).is_err());
    }

    #[test]
    fn test_huge_ttl_is_clamped() {
        let service = TokenService::new("secret", i64::MAX);
        let token = service.issue(&principal()).unwrap();
        let claims = service.verify(&token).unwrap();
        assert_eq!(claims.exp - claims.iat, MAX_TOKEN_TTL_MINUTES * 60);
    }

    #[test]
    fn test_garbage_rejected() {
        let service = TokenService::new("secret", 60);
        assert!(service.verify("not.a.jwt").is_err());
    }
}
