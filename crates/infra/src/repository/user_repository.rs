//! # UserRepository
//!
//! ユーザー情報の永続化を担当するリポジトリ。
//!
//! ## 設計方針
//!
//! - **trait による抽象化**: ハンドラ層はこの trait 経由でアクセスし、
//!   テストではインメモリ実装に差し替える
//! - **ハッシュの分離**: パスワードハッシュはドメインエンティティに含めず、
//!   専用のメソッドで取得する
//! - **一意制約の変換**: メールアドレスの重複は
//!   `InfraErrorKind::Conflict` に変換してから返す

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use monban_domain::{
    password::PasswordHash,
    user::{Email, User, UserId, UserName},
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::InfraError;

/// ユーザーリポジトリトレイト
///
/// ユーザー情報の永続化操作を定義する。
/// インフラ層で具体的な実装を提供し、web 層から利用する。
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// メールアドレスでユーザーを検索
    ///
    /// # 戻り値
    ///
    /// - `Ok(Some(user))`: ユーザーが見つかった場合
    /// - `Ok(None)`: ユーザーが見つからない場合
    /// - `Err(_)`: データベースエラー
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, InfraError>;

    /// ID でユーザーを検索
    ///
    /// セッション復元（deserialize）で毎リクエスト呼び出される。
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, InfraError>;

    /// ユーザーのパスワードハッシュを取得
    ///
    /// ログイン時のパスワード検証に使用する。
    async fn password_hash_of(&self, id: &UserId) -> Result<Option<PasswordHash>, InfraError>;

    /// ユーザーを作成（サインアップ）
    ///
    /// # エラー
    ///
    /// メールアドレスが登録済みの場合は `InfraErrorKind::Conflict` を返す。
    async fn create(&self, user: &User, password_hash: &PasswordHash) -> Result<(), InfraError>;

    /// 登録済みユーザー数を取得
    ///
    /// ランディングページの会員数表示に使用する。
    async fn count(&self) -> Result<i64, InfraError>;

    /// 最終ログイン日時を現在時刻に更新
    async fn update_last_login(&self, id: &UserId) -> Result<(), InfraError>;
}

/// users テーブルの行
#[derive(sqlx::FromRow)]
struct UserRow {
    id:            Uuid,
    email:         String,
    name:          String,
    last_login_at: Option<DateTime<Utc>>,
    created_at:    DateTime<Utc>,
    updated_at:    DateTime<Utc>,
}

impl UserRow {
    /// 行からドメインエンティティを復元する
    ///
    /// DB に保存された値は作成時にバリデーション済みのため、
    /// ここでの検証失敗はデータ破損を意味する（Unexpected 扱い）。
    fn into_user(self) -> Result<User, InfraError> {
        Ok(User::from_db(
            UserId::from_uuid(self.id),
            Email::new(&self.email).map_err(|e| InfraError::unexpected(e.to_string()))?,
            UserName::new(&self.name).map_err(|e| InfraError::unexpected(e.to_string()))?,
            self.last_login_at,
            self.created_at,
            self.updated_at,
        ))
    }
}

/// PostgreSQL 実装の UserRepository
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(%email))]
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, InfraError> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT
                id,
                email,
                name,
                last_login_at,
                created_at,
                updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, InfraError> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT
                id,
                email,
                name,
                last_login_at,
                created_at,
                updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn password_hash_of(&self, id: &UserId) -> Result<Option<PasswordHash>, InfraError> {
        let hash: Option<String> =
            sqlx::query_scalar("SELECT password_hash FROM users WHERE id = $1")
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await?;

        Ok(hash.map(PasswordHash::new))
    }

    #[tracing::instrument(skip_all, level = "debug", fields(user_id = %user.id()))]
    async fn create(&self, user: &User, password_hash: &PasswordHash) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, name, password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user.id().as_uuid())
        .bind(user.email().as_str())
        .bind(user.name().as_str())
        .bind(password_hash.as_str())
        .bind(user.created_at())
        .bind(user.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            // メールアドレスの一意制約違反は Conflict として返す
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                InfraError::conflict("User", user.email().as_str())
            }
            _ => InfraError::from(e),
        })?;

        Ok(())
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn count(&self) -> Result<i64, InfraError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn update_last_login(&self, id: &UserId) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            UPDATE users
            SET last_login_at = now(), updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
