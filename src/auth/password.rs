// ==========================================
// MES 后端 - 密码哈希 (bcrypt)
// ==========================================
// 存储格式: 标准 bcrypt 串 ($2a$ / $2b$ / $2y$)
// ==========================================

use thiserror::Error;

/// 新密码的 bcrypt 成本因子
pub const HASH_COST: u32 = bcrypt::DEFAULT_COST;

#[derive(Error, Debug)]
#[error("密码哈希失败: {0}")]
pub struct PasswordError(#[from] bcrypt::BcryptError);

/// 生成 bcrypt 密码哈希（盐随机生成）
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    Ok(bcrypt::hash(password, HASH_COST)?)
}

/// 校验密码
///
/// 存储值不是合法 bcrypt 串时返回 false
pub fn verify_password(password: &str, stored: &str) -> bool {
    match bcrypt::verify(password, stored) {
        Ok(matched) => matched,
        Err(e) => {
            tracing::debug!(error = %e, "存储的密码哈希无法解析");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let stored = hash_password("hunter2").unwrap();
        assert!(stored.starts_with("$2b$12$"));
        assert!(verify_password("hunter2", &stored));
        assert!(!verify_password("hunter3", &stored));
    }

    #[test]
    fn test_salt_differs_per_hash() {
        assert_ne!(hash_password("same").unwrap(), hash_password("same").unwrap());
    }

    #[test]
    fn test_verifies_existing_bcrypt_hash() {
        // python bcrypt.hashpw 生成的 $2b$ 哈希
        let stored = "$2b$04$EGdrhbKUv8Oc9vGiXX0HQOxSg445d458Muh7DAHskb6QbtCvdxcie";
        assert!(verify_password("correctbatteryhorsestapler", stored));
        assert!(!verify_password("correct horse", stored));
    }

    #[test]
    fn test_malformed_stored_value_rejected() {
        assert!(!verify_password("x", ""));
        assert!(!verify_password("x", "plain-text"));
        assert!(!verify_password("x", "sha256$salt$abc"));
    }
}
