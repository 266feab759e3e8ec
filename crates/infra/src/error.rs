//! # インフラ層エラー定義
//!
//! データベースや Redis との通信で発生するエラーを表現する。
//!
//! ## 設計方針
//!
//! - **エラーの変換**: sqlx::Error, redis::RedisError などをラップ
//! - **ドメインエラーとの分離**: インフラ固有のエラーを明示
//! - **SpanTrace 自動捕捉**: `From` 実装や convenience constructor で
//!   エラー生成時の呼び出し経路を自動記録する
//!
//! ## 構造
//!
//! `std::io::Error` と同じ struct + enum パターンを採用:
//! - [`InfraError`]: エラー種別（[`InfraErrorKind`]）と [`SpanTrace`] を保持するラッパー
//! - [`InfraErrorKind`]: エラーの具体的な種別（Database, Redis, Conflict 等）

use std::fmt;

use derive_more::Display;
use thiserror::Error;
use tracing_error::SpanTrace;

/// インフラ層で発生するエラー
///
/// エラー種別（[`InfraErrorKind`]）と [`SpanTrace`]（呼び出し経路）を保持する。
/// `From<sqlx::Error>` 等の変換や convenience constructor でエラーを生成すると、
/// その時点のスパン情報が自動的にキャプチャされる。
///
/// ## パターンマッチ
///
/// エラー種別に応じた処理には [`kind()`](InfraError::kind) を使用する:
///
/// ```ignore
/// match error.kind() {
///     InfraErrorKind::Conflict { entity, id } => { /* 競合処理 */ }
///     _ => { /* その他 */ }
/// }
/// ```
#[derive(Display)]
#[display("{kind}")]
pub struct InfraError {
    kind:       InfraErrorKind,
    span_trace: SpanTrace,
}

/// インフラ層エラーの種別
///
/// データベースクエリや Redis 操作などで発生するエラーの具体的な種別。
/// web 層でこのエラー種別に応じて適切な HTTP レスポンスに変換する。
#[derive(Debug, Error)]
pub enum InfraErrorKind {
    /// データベースエラー
    ///
    /// SQL クエリの実行失敗、接続エラー、制約違反など。
    #[error("データベースエラー: {0}")]
    Database(#[source] sqlx::Error),

    /// Redis エラー
    ///
    /// Redis への接続失敗、コマンド実行エラーなど。
    #[error("Redis エラー: {0}")]
    Redis(#[source] redis::RedisError),

    /// シリアライズ/デシリアライズエラー
    ///
    /// セッションデータの JSON 変換に失敗した場合に使用する。
    #[error("シリアライズエラー: {0}")]
    Serialization(#[source] serde_json::Error),

    /// 一意制約違反（重複登録）
    ///
    /// INSERT 時に一意制約に違反した場合。
    /// 典型的には登録済みメールアドレスでのサインアップで発生する。
    #[error("競合が発生しました: {entity}(id={id})")]
    Conflict {
        /// エンティティ名（例: "User"）
        entity: String,
        /// 競合したキー
        id:     String,
    },

    /// 予期しないエラー
    ///
    /// 上記に分類できない予期しないエラー。
    #[error("予期しないエラー: {0}")]
    Unexpected(String),
}

// ===== InfraError のメソッド =====

impl InfraError {
    /// エラー種別を取得する
    pub fn kind(&self) -> &InfraErrorKind {
        &self.kind
    }

    /// SpanTrace を取得する
    pub fn span_trace(&self) -> &SpanTrace {
        &self.span_trace
    }

    /// Conflict バリアントの場合、entity と id を返す
    ///
    /// パターンマッチで所有権の競合を避けるためのヘルパー。
    pub fn as_conflict(&self) -> Option<(&str, &str)> {
        match &self.kind {
            InfraErrorKind::Conflict { entity, id } => Some((entity, id)),
            _ => None,
        }
    }

    // ===== Convenience constructors =====

    /// 一意制約違反エラーを生成する
    pub fn conflict(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind:       InfraErrorKind::Conflict {
                entity: entity.into(),
                id:     id.into(),
            },
            span_trace: SpanTrace::capture(),
        }
    }

    /// 予期しないエラーを生成する
    pub fn unexpected(msg: impl Into<String>) -> Self {
        Self {
            kind:       InfraErrorKind::Unexpected(msg.into()),
            span_trace: SpanTrace::capture(),
        }
    }
}

// ===== トレイト実装 =====

impl fmt::Debug for InfraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InfraError")
            .field("kind", &self.kind)
            .field("span_trace", &self.span_trace.to_string())
            .finish()
    }
}

impl std::error::Error for InfraError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.kind.source()
    }
}

impl From<InfraErrorKind> for InfraError {
    fn from(kind: InfraErrorKind) -> Self {
        Self {
            kind,
            span_trace: SpanTrace::capture(),
        }
    }
}

impl From<sqlx::Error> for InfraError {
    fn from(e: sqlx::Error) -> Self {
        InfraErrorKind::Database(e).into()
    }
}

impl From<redis::RedisError> for InfraError {
    fn from(e: redis::RedisError) -> Self {
        InfraErrorKind::Redis(e).into()
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(e: serde_json::Error) -> Self {
        InfraErrorKind::Serialization(e).into()
    }
}
