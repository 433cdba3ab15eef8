// ==========================================
// MES 后端 - 认证与授权
// ==========================================
// - password: 加盐 SHA-256 密码哈希
// - token: HS256 访问令牌
// - policy: 角色访问策略
// ==========================================

pub mod password;
pub mod policy;
pub mod token;

pub use password::{hash_password, verify_password, PasswordError};
pub use policy::{AccessPolicy, Action, Decision, DenyReason, Principal, Resource, RolePolicy};
pub use token::{Claims, TokenError, TokenService};
