//! # ドメイン層エラー定義
//!
//! ビジネスルール違反やドメイン固有の例外状態を表現するエラー型。
//!
//! ## 設計方針
//!
//! - **型による分類**: エラーの種類を列挙型で明示し、パターンマッチで処理可能に
//! - **thiserror 活用**: `#[error(...)]` マクロでエラーメッセージを自動生成
//! - **HTTP ステータスへのマッピング**: web 層でステータスコードに変換可能
//!
//! ## エラーの種類と HTTP ステータスの対応
//!
//! | エラー種別 | HTTP ステータス | 用途 |
//! |-----------|----------------|------|
//! | `Validation` | 400 Bad Request | サインアップ入力の検証失敗 |
//! | `NotFound` | 404 Not Found | エンティティが存在しない |
//! | `Conflict` | 409 Conflict | メールアドレスの重複など |

use thiserror::Error;

/// ドメイン層で発生するエラー
///
/// ビジネスロジックの実行中に発生する例外状態を表現する。
/// web 層でこのエラーを受け取り、適切な HTTP レスポンスに変換する。
#[derive(Debug, Error)]
pub enum DomainError {
    /// バリデーションエラー
    ///
    /// 入力値がビジネスルールに違反している場合に使用する。
    ///
    /// # 例
    ///
    /// - 必須フィールドが未入力
    /// - 文字数制限の超過
    /// - 不正なフォーマット
    #[error("バリデーションエラー: {0}")]
    Validation(String),

    /// エンティティが見つからない
    ///
    /// 指定された識別子のエンティティがデータベースに存在しない場合に使用する。
    /// `entity_type` にはエンティティの種類（"User" など）を指定し、
    /// エラーメッセージを具体的にする。
    #[error("{entity_type} が見つかりません: {id}")]
    NotFound {
        /// エンティティの種類（コンパイル時に決定される `&'static str`）
        entity_type: &'static str,
        /// 検索に使用した識別子
        id:          String,
    },

    /// 競合エラー
    ///
    /// 既存データと競合した場合に使用する。
    /// 典型的には、登録済みメールアドレスでの再サインアップ時に発生する。
    #[error("競合が発生しました: {0}")]
    Conflict(String),
}
