//! # Monban ドメイン層
//!
//! 会員ポータルのエンティティと値オブジェクトを定義する。
//!
//! ## 設計方針
//!
//! - **Newtype パターン**: ID や値オブジェクトはプリミティブ型をラップし、型安全性を確保
//! - **バリデーション**: 値オブジェクトの生成時に検証し、不正な値の存在を型レベルで排除
//! - **インフラ非依存**: このクレートは DB やフレームワークに依存しない

pub mod error;
pub mod password;
pub mod user;

pub use error::DomainError;
