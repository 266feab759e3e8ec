//! # Monban インフラ層
//!
//! データベース・Redis・パスワードハッシュなど、外部リソースへの
//! アクセスを担当するクレート。
//!
//! ## モジュール構成
//!
//! - `db`: PostgreSQL 接続プールとマイグレーション
//! - `session`: Redis を使用したセッション管理
//! - `password`: Argon2id によるパスワードのハッシュ化と検証
//! - `repository`: ユーザーリポジトリ（trait + PostgreSQL 実装）
//! - `error`: インフラ層エラー定義
//! - `mock`: テスト用インメモリ実装（`test-utils` feature）

pub mod db;
pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod password;
pub mod repository;
pub mod session;

pub use error::{InfraError, InfraErrorKind};
pub use password::{Argon2PasswordChecker, Argon2PasswordHasher, PasswordChecker, PasswordHasher};
pub use repository::UserRepository;
pub use session::{RedisSessionManager, SessionData, SessionManager, SessionPayload};
