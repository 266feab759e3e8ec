//! # 認証
//!
//! プラガブルなストラテジ方式の認証を提供する。
//!
//! ## 構成
//!
//! - [`Strategy`]: 認証方式のトレイト。[`Authenticator`] に名前付きで登録する
//! - [`LocalStrategy`]: メールアドレスとパスワードによる認証
//! - [`Authenticator`]: 認証の入口。セッションへの serialize / deserialize も担う
//!
//! ## serialize / deserialize
//!
//! セッションにはユーザー ID のみを格納し（serialize）、
//! リクエストごとにデータストアからユーザーを復元する（deserialize）。
//! ユーザー情報の変更が次のリクエストから反映される。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use monban_domain::{
    password::{PasswordHash, PlainPassword},
    user::{Email, User},
};
use monban_infra::{InfraError, PasswordChecker, SessionPayload, UserRepository};
use thiserror::Error;

/// ログインフォームから受け取る認証情報
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email:    String,
    pub password: PlainPassword,
}

/// 認証失敗の理由
///
/// ログに記録する区別であり、ユーザーへの表示メッセージは
/// 理由によらず同一（アカウントの有無を推測させない）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    /// メールアドレスに対応するユーザーが存在しない
    UserNotFound,
    /// パスワードが一致しない
    InvalidCredentials,
}

impl AuthFailure {
    /// ユーザー向けの表示メッセージ
    pub fn user_message(&self) -> &'static str {
        "メールアドレスまたはパスワードが正しくありません"
    }
}

/// 認証処理のエラー
#[derive(Debug, Error)]
pub enum AuthError {
    /// 認証失敗（入力の問題）
    #[error("認証に失敗しました: {0:?}")]
    Failure(AuthFailure),

    /// 登録されていないストラテジ名が指定された
    #[error("未登録の認証ストラテジです: {0}")]
    UnknownStrategy(String),

    /// インフラ層のエラー（データストア障害など）
    #[error(transparent)]
    Infra(#[from] InfraError),
}

/// 認証ストラテジ
///
/// [`Authenticator`] に名前付きで登録され、ログイン時に名前で選択される。
#[async_trait]
pub trait Strategy: Send + Sync {
    /// 認証情報を検証し、成功時にユーザーを返す
    async fn authenticate(&self, credentials: &Credentials) -> Result<User, AuthError>;
}

// ユーザー不在時のダミー検証に使うハッシュ。有効な Argon2id 形式であれば
// 値は何でもよい
const DUMMY_HASH: &str = "$argon2id$v=19$m=65536,t=1,p=1$olntqw+EoVpwH4B1vUAI0A$5yCA1izLODgz8nQOInDGwbuQB/AS0sIQDwpmIilve5M";

/// メールアドレスとパスワードによる認証ストラテジ
pub struct LocalStrategy {
    user_repository:  Arc<dyn UserRepository>,
    password_checker: Arc<dyn PasswordChecker>,
}

impl LocalStrategy {
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        password_checker: Arc<dyn PasswordChecker>,
    ) -> Self {
        Self {
            user_repository,
            password_checker,
        }
    }
}

#[async_trait]
impl Strategy for LocalStrategy {
    async fn authenticate(&self, credentials: &Credentials) -> Result<User, AuthError> {
        // 形式不正のメールアドレスは検索するまでもなく失敗
        let Ok(email) = Email::new(credentials.email.as_str()) else {
            return Err(AuthError::Failure(AuthFailure::UserNotFound));
        };

        let Some(user) = self.user_repository.find_by_email(&email).await? else {
            // ユーザーの有無で応答時間が変わらないようダミー検証を行う
            let _ = self
                .password_checker
                .verify(&credentials.password, &PasswordHash::new(DUMMY_HASH));
            return Err(AuthError::Failure(AuthFailure::UserNotFound));
        };

        let Some(hash) = self.user_repository.password_hash_of(user.id()).await? else {
            return Err(AuthError::Failure(AuthFailure::InvalidCredentials));
        };

        let result = self.password_checker.verify(&credentials.password, &hash)?;
        if result.is_mismatch() {
            return Err(AuthError::Failure(AuthFailure::InvalidCredentials));
        }

        Ok(user)
    }
}

/// 認証の入口
///
/// 名前付きストラテジの束を保持し、セッションとの間の
/// serialize / deserialize を担う。
pub struct Authenticator {
    strategies:      HashMap<String, Arc<dyn Strategy>>,
    user_repository: Arc<dyn UserRepository>,
}

impl Authenticator {
    pub fn new(user_repository: Arc<dyn UserRepository>) -> Self {
        Self {
            strategies: HashMap::new(),
            user_repository,
        }
    }

    /// ストラテジを名前付きで登録する（ビルダー形式）
    #[must_use]
    pub fn register(mut self, name: impl Into<String>, strategy: Arc<dyn Strategy>) -> Self {
        self.strategies.insert(name.into(), strategy);
        self
    }

    /// 指定したストラテジで認証を実行する
    ///
    /// # エラー
    ///
    /// 未登録のストラテジ名の場合は [`AuthError::UnknownStrategy`]。
    pub async fn authenticate(
        &self,
        strategy_name: &str,
        credentials: &Credentials,
    ) -> Result<User, AuthError> {
        let strategy = self
            .strategies
            .get(strategy_name)
            .ok_or_else(|| AuthError::UnknownStrategy(strategy_name.to_string()))?;

        strategy.authenticate(credentials).await
    }

    /// ユーザーからセッション格納用のペイロードを生成する
    pub fn serialize_user(&self, user: &User) -> SessionPayload {
        SessionPayload::new(user.id().clone())
    }

    /// セッションのペイロードからユーザーを復元する
    ///
    /// ユーザーが削除済みの場合は `Ok(None)` を返し、
    /// セッションは匿名として扱われる。
    pub async fn deserialize_user(
        &self,
        payload: &SessionPayload,
    ) -> Result<Option<User>, InfraError> {
        self.user_repository.find_by_id(payload.user_id()).await
    }
}

#[cfg(test)]
mod tests {
    use monban_domain::user::{UserId, UserName};
    use monban_infra::{Argon2PasswordChecker, mock::MockUserRepository};
    use pretty_assertions::assert_eq;

    use super::*;

    // password123 のハッシュ
    const TEST_HASH: &str = "$argon2id$v=19$m=65536,t=1,p=1$olntqw+EoVpwH4B1vUAI0A$5yCA1izLODgz8nQOInDGwbuQB/AS0sIQDwpmIilve5M";

    fn seeded_repository() -> (Arc<MockUserRepository>, User) {
        let user = User::new(
            UserId::new(),
            Email::new("alice@example.com").unwrap(),
            UserName::new("Alice").unwrap(),
            chrono::Utc::now(),
        );

        let repo = Arc::new(MockUserRepository::new());
        repo.add_user(user.clone(), PasswordHash::new(TEST_HASH));

        (repo, user)
    }

    fn local_authenticator(repo: Arc<MockUserRepository>) -> Authenticator {
        let strategy = LocalStrategy::new(repo.clone(), Arc::new(Argon2PasswordChecker::new()));
        Authenticator::new(repo).register("local", Arc::new(strategy))
    }

    fn credentials(email: &str, password: &str) -> Credentials {
        Credentials {
            email:    email.to_string(),
            password: PlainPassword::new(password),
        }
    }

    #[tokio::test]
    async fn test_正しい認証情報でログインできる() {
        let (repo, user) = seeded_repository();
        let sut = local_authenticator(repo);

        let result = sut
            .authenticate("local", &credentials("alice@example.com", "password123"))
            .await
            .unwrap();

        assert_eq!(result.id(), user.id());
    }

    #[tokio::test]
    async fn test_パスワード不一致はinvalid_credentials() {
        let (repo, _) = seeded_repository();
        let sut = local_authenticator(repo);

        let result = sut
            .authenticate("local", &credentials("alice@example.com", "wrongpassword"))
            .await;

        assert!(matches!(
            result,
            Err(AuthError::Failure(AuthFailure::InvalidCredentials))
        ));
    }

    #[tokio::test]
    async fn test_未登録ユーザーはuser_not_found() {
        let (repo, _) = seeded_repository();
        let sut = local_authenticator(repo);

        let result = sut
            .authenticate("local", &credentials("nobody@example.com", "password123"))
            .await;

        assert!(matches!(
            result,
            Err(AuthError::Failure(AuthFailure::UserNotFound))
        ));
    }

    #[tokio::test]
    async fn test_形式不正のメールアドレスはuser_not_found() {
        let (repo, _) = seeded_repository();
        let sut = local_authenticator(repo);

        let result = sut.authenticate("local", &credentials("not-an-email", "x")).await;

        assert!(matches!(
            result,
            Err(AuthError::Failure(AuthFailure::UserNotFound))
        ));
    }

    #[tokio::test]
    async fn test_未登録ストラテジはunknown_strategy() {
        let (repo, _) = seeded_repository();
        let sut = local_authenticator(repo);

        let result = sut
            .authenticate("oauth", &credentials("alice@example.com", "password123"))
            .await;

        assert!(matches!(result, Err(AuthError::UnknownStrategy(name)) if name == "oauth"));
    }

    #[tokio::test]
    async fn test_データストア障害はinfraエラーになる() {
        let repo = Arc::new(MockUserRepository::fail());
        let sut = local_authenticator(repo);

        let result = sut
            .authenticate("local", &credentials("alice@example.com", "password123"))
            .await;

        assert!(matches!(result, Err(AuthError::Infra(_))));
    }

    #[tokio::test]
    async fn test_serializeとdeserializeでユーザーを往復できる() {
        let (repo, user) = seeded_repository();
        let sut = local_authenticator(repo);

        let payload = sut.serialize_user(&user);
        let restored = sut.deserialize_user(&payload).await.unwrap();

        assert_eq!(restored, Some(user));
    }

    #[tokio::test]
    async fn test_削除済みユーザーのdeserializeはnone() {
        let (repo, _) = seeded_repository();
        let sut = local_authenticator(repo);

        let payload = SessionPayload::new(UserId::new());
        let restored = sut.deserialize_user(&payload).await.unwrap();

        assert_eq!(restored, None);
    }
}
