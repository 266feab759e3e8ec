//! # Monban Web サーバーライブラリ
//!
//! 会員ポータルのコアモジュール。
//!
//! ## モジュール構成
//!
//! - `app_builder`: DI とルーターツリーの構築
//! - `auth`: Authenticator とプラガブルな認証ストラテジ
//! - `config`: 環境変数からの設定読み込み
//! - `error`: ページ用・JSON 用エラーとフォールバック
//! - `handler`: HTTP ハンドラ
//! - `middleware`: セッションミドルウェア
//! - `view`: tera によるページレンダリング

pub mod app_builder;
pub mod auth;
pub mod config;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod view;
