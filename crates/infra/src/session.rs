//! # セッション管理
//!
//! Redis を使用したセッション管理を提供する。
//!
//! ## Redis キー設計
//!
//! | キー | 値 | TTL |
//! |-----|-----|-----|
//! | `session:{session_id}` | SessionData (JSON) | Cookie の max-age と同じ秒数 |
//!
//! ## セッションの状態
//!
//! セッションは「完全に匿名」（`payload` なし）か「完全に認証済み」
//! （`payload` あり）のどちらかであり、中間状態は存在しない。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use monban_domain::user::UserId;
use redis::{AsyncCommands, aio::ConnectionManager};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::InfraError;

/// セッションに格納される認証済みアイデンティティ
///
/// Authenticator の serialize 操作でユーザーから生成される最小限のデータ。
/// 毎リクエストの deserialize 操作でユーザーに復元される。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPayload {
    user_id: UserId,
}

impl SessionPayload {
    /// ユーザー ID からペイロードを作成する
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }
}

/// セッションデータ
///
/// Redis に JSON 形式で保存されるセッション情報。
/// ログイン成功時に認証済みセッションが作成され、
/// ログアウトまたは TTL 経過で削除される。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    payload:          Option<SessionPayload>,
    created_at:       DateTime<Utc>,
    last_accessed_at: DateTime<Utc>,
}

impl SessionData {
    /// 匿名セッションを作成する
    ///
    /// `created_at` と `last_accessed_at` は現在時刻で初期化される。
    pub fn anonymous() -> Self {
        let now = Utc::now();
        Self {
            payload:          None,
            created_at:       now,
            last_accessed_at: now,
        }
    }

    /// 認証済みセッションを作成する（ログイン成功時）
    pub fn authenticated(payload: SessionPayload) -> Self {
        let now = Utc::now();
        Self {
            payload:          Some(payload),
            created_at:       now,
            last_accessed_at: now,
        }
    }

    /// 格納されたアイデンティティを取得する
    ///
    /// 匿名セッションの場合は `None`。
    pub fn payload(&self) -> Option<&SessionPayload> {
        self.payload.as_ref()
    }

    /// 認証済みセッションかどうか
    pub fn is_authenticated(&self) -> bool {
        self.payload.is_some()
    }

    /// 最終アクセス時刻を現在時刻に更新する
    ///
    /// resave ポリシーで TTL を延長する際に呼び出される。
    pub fn touch(&mut self) {
        self.last_accessed_at = Utc::now();
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_accessed_at(&self) -> DateTime<Utc> {
        self.last_accessed_at
    }
}

/// セッション管理トレイト
///
/// セッションの作成・取得・保存・削除を行う。
/// 実装は Redis を使用する [`RedisSessionManager`] を参照。
#[async_trait]
pub trait SessionManager: Send + Sync {
    /// セッションを作成し、セッション ID を返す
    ///
    /// # 戻り値
    ///
    /// 生成されたセッション ID（UUID v4）
    async fn create(&self, data: &SessionData) -> Result<String, InfraError>;

    /// セッションを取得する
    ///
    /// # 戻り値
    ///
    /// セッションが存在すれば `Some(SessionData)`、なければ `None`
    async fn get(&self, session_id: &str) -> Result<Option<SessionData>, InfraError>;

    /// セッションを上書き保存し、TTL をリセットする
    ///
    /// resave ポリシーによるアクセス時の TTL 延長に使用する。
    async fn save(&self, session_id: &str, data: &SessionData) -> Result<(), InfraError>;

    /// セッションを削除する
    ///
    /// 存在しないセッションを削除しても成功とする。
    async fn delete(&self, session_id: &str) -> Result<(), InfraError>;

    /// セッションの TTL（残り秒数）を取得する（テスト用）
    async fn get_ttl(&self, session_id: &str) -> Result<Option<i64>, InfraError>;
}

/// Redis を使用したセッションマネージャ
pub struct RedisSessionManager {
    conn:        ConnectionManager,
    ttl_seconds: u64,
}

impl RedisSessionManager {
    /// 新しい RedisSessionManager を作成する
    ///
    /// # 引数
    ///
    /// - `redis_url`: Redis 接続 URL（例: `redis://localhost:6379`）
    /// - `ttl_seconds`: セッションの有効期限（Cookie の max-age と揃える）
    pub async fn new(redis_url: &str, ttl_seconds: u64) -> Result<Self, InfraError> {
        let client = redis::Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn, ttl_seconds })
    }

    /// セッションキーを生成する
    fn session_key(session_id: &str) -> String {
        format!("session:{session_id}")
    }
}

#[async_trait]
impl SessionManager for RedisSessionManager {
    #[tracing::instrument(skip_all, level = "debug")]
    async fn create(&self, data: &SessionData) -> Result<String, InfraError> {
        // UUID v4 でセッション ID を生成（暗号論的に安全なランダム値）
        let session_id = Uuid::new_v4().to_string();
        let key = Self::session_key(&session_id);
        let json = serde_json::to_string(data)?;

        let mut conn = self.conn.clone();
        let _: () = conn.set_ex(&key, json, self.ttl_seconds).await?;

        Ok(session_id)
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn get(&self, session_id: &str) -> Result<Option<SessionData>, InfraError> {
        let key = Self::session_key(session_id);
        let mut conn = self.conn.clone();

        let result: Option<String> = conn.get(&key).await?;

        match result {
            Some(json) => {
                let data: SessionData = serde_json::from_str(&json)?;
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn save(&self, session_id: &str, data: &SessionData) -> Result<(), InfraError> {
        let key = Self::session_key(session_id);
        let json = serde_json::to_string(data)?;

        let mut conn = self.conn.clone();
        let _: () = conn.set_ex(&key, json, self.ttl_seconds).await?;

        Ok(())
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn delete(&self, session_id: &str) -> Result<(), InfraError> {
        let key = Self::session_key(session_id);
        let mut conn = self.conn.clone();
        let _: () = conn.del(&key).await?;
        Ok(())
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn get_ttl(&self, session_id: &str) -> Result<Option<i64>, InfraError> {
        let key = Self::session_key(session_id);
        let mut conn = self.conn.clone();

        let ttl: i64 = conn.ttl(&key).await?;

        // TTL が -2 の場合はキーが存在しない、-1 の場合は TTL が設定されていない
        if ttl < 0 { Ok(None) } else { Ok(Some(ttl)) }
    }
}
