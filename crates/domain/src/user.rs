//! # ユーザー
//!
//! ユーザーエンティティとそれに関連する値オブジェクトを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | ライフサイクル |
//! |---|------------|--------------|
//! | [`User`] | 会員 | サインアップで作成、ログインで参照。それ以外では変更されない |
//! | [`Email`] | メールアドレス | ログイン時の識別子。テーブル内で一意 |
//! | [`UserName`] | 表示名 | プロフィールページに表示される |
//!
//! ## 設計方針
//!
//! - **Newtype パターン**: UserId は UUID をラップし、型安全性を確保
//! - **不変性**: エンティティフィールドは基本的に不変、変更はメソッド経由
//! - **バリデーション**: 値オブジェクトの生成時に検証ロジックを実行
//!
//! ## 使用例
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use monban_domain::user::{Email, User, UserId, UserName};
//!
//! let user = User::new(
//!     UserId::new(),
//!     Email::new("user@example.com")?,
//!     UserName::new("山田太郎")?,
//!     chrono::Utc::now(),
//! );
//!
//! assert_eq!(user.email().as_str(), "user@example.com");
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::DomainError;

/// ユーザー ID（一意識別子）
///
/// UUID v7 を使用し、生成順にソート可能。
/// Newtype パターンで型安全性を確保。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[display("{_0}")]
pub struct UserId(Uuid);

impl UserId {
    /// 新しいユーザー ID を生成する
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// 既存の UUID からユーザー ID を作成する
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 内部の UUID 参照を取得する
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

/// メールアドレス（値オブジェクト）
///
/// サインアップ・ログインの識別子。
/// 生成時にバリデーションを実行し、不正な値の作成を防ぐ。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    /// メールアドレスを作成する
    ///
    /// # バリデーション
    ///
    /// - 空文字列ではない
    /// - `local@domain` の形式であること
    /// - 最大 255 文字
    ///
    /// # エラー
    ///
    /// バリデーションに失敗した場合は `DomainError::Validation` を返す。
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();

        if value.is_empty() {
            return Err(DomainError::Validation(
                "メールアドレスは必須です".to_string(),
            ));
        }

        // 基本的な構造検証: local@domain の形式であること
        let Some((local, domain)) = value.split_once('@') else {
            return Err(DomainError::Validation(
                "メールアドレスの形式が不正です".to_string(),
            ));
        };

        if local.is_empty() || domain.is_empty() {
            return Err(DomainError::Validation(
                "メールアドレスの形式が不正です".to_string(),
            ));
        }

        if value.len() > 255 {
            return Err(DomainError::Validation(
                "メールアドレスは255文字以内である必要があります".to_string(),
            ));
        }

        Ok(Self(value))
    }

    /// 文字列参照を取得する
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 所有権を持つ文字列に変換する
    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ユーザー表示名（値オブジェクト）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserName(String);

impl UserName {
    /// 表示名を作成する
    ///
    /// # バリデーション
    ///
    /// - 空文字列（空白のみを含む）ではない
    /// - 最大 100 文字
    ///
    /// # エラー
    ///
    /// バリデーションに失敗した場合は `DomainError::Validation` を返す。
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();

        if value.trim().is_empty() {
            return Err(DomainError::Validation("表示名は必須です".to_string()));
        }

        if value.chars().count() > 100 {
            return Err(DomainError::Validation(
                "表示名は100文字以内である必要があります".to_string(),
            ));
        }

        Ok(Self(value))
    }

    /// 文字列参照を取得する
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ユーザーエンティティ
///
/// サインアップで作成され、ログインで参照される会員。
/// パスワードハッシュはエンティティに含めない（インフラ層が
/// users テーブルの `password_hash` カラムとして管理する）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id:            UserId,
    email:         Email,
    name:          UserName,
    last_login_at: Option<DateTime<Utc>>,
    created_at:    DateTime<Utc>,
    updated_at:    DateTime<Utc>,
}

impl User {
    /// 新規ユーザーを作成する（サインアップ時）
    ///
    /// `created_at` / `updated_at` は引数の現在時刻で初期化され、
    /// `last_login_at` は未ログインを表す `None` となる。
    pub fn new(id: UserId, email: Email, name: UserName, now: DateTime<Utc>) -> Self {
        Self {
            id,
            email,
            name,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// データベースの行からエンティティを復元する
    ///
    /// バリデーション済みの値オブジェクトを受け取る。
    /// インフラ層のリポジトリのみが使用する想定。
    pub fn from_db(
        id: UserId,
        email: Email,
        name: UserName,
        last_login_at: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email,
            name,
            last_login_at,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn name(&self) -> &UserName {
        &self.name
    }

    pub fn last_login_at(&self) -> Option<DateTime<Utc>> {
        self.last_login_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    // ===== Email テスト =====

    #[rstest]
    fn test_正しいメールアドレスを作成できる() {
        let email = Email::new("user@example.com").unwrap();
        assert_eq!(email.as_str(), "user@example.com");
    }

    #[rstest]
    #[case("")]
    #[case("no-at-sign")]
    #[case("@example.com")]
    #[case("user@")]
    fn test_不正なメールアドレスはバリデーションエラー(#[case] input: &str) {
        let result = Email::new(input);
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[rstest]
    fn test_256文字のメールアドレスはバリデーションエラー() {
        let local = "a".repeat(244);
        let input = format!("{local}@example.com");
        assert_eq!(input.len(), 256);

        let result = Email::new(input);
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    // ===== UserName テスト =====

    #[rstest]
    fn test_表示名を作成できる() {
        let name = UserName::new("山田太郎").unwrap();
        assert_eq!(name.as_str(), "山田太郎");
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn test_空の表示名はバリデーションエラー(#[case] input: &str) {
        let result = UserName::new(input);
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[rstest]
    fn test_101文字の表示名はバリデーションエラー() {
        let input = "あ".repeat(101);
        let result = UserName::new(input);
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    // ===== User テスト =====

    #[rstest]
    fn test_新規ユーザーは未ログイン状態で作成される() {
        let now = chrono::Utc::now();
        let user = User::new(
            UserId::new(),
            Email::new("user@example.com").unwrap(),
            UserName::new("Test User").unwrap(),
            now,
        );

        assert_eq!(user.last_login_at(), None);
        assert_eq!(user.created_at(), now);
        assert_eq!(user.updated_at(), now);
    }

    #[rstest]
    fn test_user_idはuuid_v7で生成順にソート可能() {
        let id1 = UserId::new();
        let id2 = UserId::new();

        assert!(id1.as_uuid() < id2.as_uuid());
    }
}
