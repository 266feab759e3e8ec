//! # パスワードハッシュ
//!
//! Argon2id によるパスワードのハッシュ化と検証を提供する。
//!
//! サインアップではハッシュ化（[`PasswordHasher`]）、
//! ログインでは検証（[`PasswordChecker`]）を使用する。

use argon2::{
    Argon2,
    Params,
    PasswordHasher as _,
    PasswordVerifier as _,
    password_hash::{PasswordHash as Argon2PasswordHash, SaltString, rand_core::OsRng},
};
use monban_domain::password::{PasswordHash, PasswordVerifyResult, PlainPassword};

use crate::InfraError;

/// OWASP 推奨パラメータ（RFC 9106）の Argon2id インスタンスを構築する
///
/// - Memory: 64 MB
/// - Iterations: 1
/// - Parallelism: 1
fn argon2() -> Argon2<'static> {
    let params = Params::new(
        65536, // memory (KB) = 64 MB
        1,     // iterations
        1,     // parallelism
        None,  // output length (default: 32)
    )
    .expect("Argon2 パラメータが不正です");

    Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params)
}

/// パスワード検証を担当するトレイト
pub trait PasswordChecker: Send + Sync {
    /// パスワードを検証する
    ///
    /// # Errors
    ///
    /// - 不正なハッシュ形式の場合
    fn verify(
        &self,
        password: &PlainPassword,
        hash: &PasswordHash,
    ) -> Result<PasswordVerifyResult, InfraError>;
}

/// パスワードのハッシュ化を担当するトレイト
pub trait PasswordHasher: Send + Sync {
    /// パスワードをハッシュ化する
    ///
    /// ソルトは呼び出しごとにランダム生成される。
    fn hash(&self, password: &PlainPassword) -> Result<PasswordHash, InfraError>;
}

/// Argon2id によるパスワード検証の実装
pub struct Argon2PasswordChecker {
    argon2: Argon2<'static>,
}

impl Argon2PasswordChecker {
    pub fn new() -> Self {
        Self { argon2: argon2() }
    }
}

impl Default for Argon2PasswordChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordChecker for Argon2PasswordChecker {
    fn verify(
        &self,
        password: &PlainPassword,
        hash: &PasswordHash,
    ) -> Result<PasswordVerifyResult, InfraError> {
        let parsed = Argon2PasswordHash::new(hash.as_str())
            .map_err(|e| InfraError::unexpected(format!("不正なハッシュ形式: {e}")))?;

        let matched = self
            .argon2
            .verify_password(password.as_str().as_bytes(), &parsed)
            .is_ok();

        Ok(PasswordVerifyResult::from(matched))
    }
}

/// Argon2id によるパスワードハッシュ化の実装
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
    pub fn new() -> Self {
        Self { argon2: argon2() }
    }
}

impl Default for Argon2PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &PlainPassword) -> Result<PasswordHash, InfraError> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2
            .hash_password(password.as_str().as_bytes(), &salt)
            .map_err(|e| InfraError::unexpected(format!("ハッシュ化に失敗しました: {e}")))?;

        Ok(PasswordHash::new(hash.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    // シードデータと同じハッシュ（password123）
    const TEST_HASH: &str = "$argon2id$v=19$m=65536,t=1,p=1$olntqw+EoVpwH4B1vUAI0A$5yCA1izLODgz8nQOInDGwbuQB/AS0sIQDwpmIilve5M";

    #[rstest]
    fn test_正しいパスワードを検証できる() {
        let checker = Argon2PasswordChecker::new();
        let password = PlainPassword::new("password123");
        let hash = PasswordHash::new(TEST_HASH);

        let result = checker.verify(&password, &hash).unwrap();

        assert!(result.is_match());
    }

    #[rstest]
    fn test_不正なパスワードを検証できる() {
        let checker = Argon2PasswordChecker::new();
        let password = PlainPassword::new("wrongpassword");
        let hash = PasswordHash::new(TEST_HASH);

        let result = checker.verify(&password, &hash).unwrap();

        assert!(result.is_mismatch());
    }

    #[rstest]
    fn test_不正なハッシュ形式はエラー() {
        let checker = Argon2PasswordChecker::new();
        let password = PlainPassword::new("password123");
        let invalid_hash = PasswordHash::new("not-a-valid-hash");

        let result = checker.verify(&password, &invalid_hash);

        assert!(result.is_err());
    }

    #[rstest]
    fn test_ハッシュ化したパスワードを検証できる() {
        let hasher = Argon2PasswordHasher::new();
        let checker = Argon2PasswordChecker::new();
        let password = PlainPassword::new("correct horse battery staple");

        let hash = hasher.hash(&password).unwrap();
        let result = checker.verify(&password, &hash).unwrap();

        assert!(result.is_match());
        assert!(hash.as_str().starts_with("$argon2id$"));
    }

    #[rstest]
    fn test_同じパスワードでもソルトによりハッシュが異なる() {
        let hasher = Argon2PasswordHasher::new();
        let password = PlainPassword::new("password123");

        let hash1 = hasher.hash(&password).unwrap();
        let hash2 = hasher.hash(&password).unwrap();

        assert_ne!(hash1, hash2);
    }
}
