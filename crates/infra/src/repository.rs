//! # リポジトリ
//!
//! 永続化層のトレイトと PostgreSQL 実装を集約する。

pub mod user_repository;

pub use user_repository::{PostgresUserRepository, UserRepository};
