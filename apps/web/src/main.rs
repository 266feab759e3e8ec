//! # Monban Web サーバー
//!
//! 会員ポータルのエントリーポイント。
//!
//! ## 起動シーケンス
//!
//! 1. `.env` の読み込みとトレーシング初期化
//! 2. 環境変数から設定を読み込み
//! 3. PostgreSQL 接続プールの作成とマイグレーション実行
//! 4. Redis セッションマネージャの作成
//! 5. ルーター構築とサーバー起動

use std::{net::SocketAddr, sync::Arc};

use monban_infra::{
    RedisSessionManager,
    SessionManager,
    UserRepository,
    db,
    repository::PostgresUserRepository,
};
use monban_shared::observability::{TracingConfig, init_tracing};
use monban_web::{app_builder::build_app, config::WebConfig};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    init_tracing(TracingConfig::from_env("web"));
    let _guard = tracing::info_span!("app", service = "web").entered();

    let config = WebConfig::from_env()?;

    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;
    tracing::info!("データベースへ接続しました");

    let ttl_seconds = u64::try_from(config.session.max_age_seconds)
        .expect("SESSION_MAX_AGE が不正です");
    let session_manager: Arc<dyn SessionManager> =
        Arc::new(RedisSessionManager::new(&config.redis_url, ttl_seconds).await?);
    tracing::info!("Redis へ接続しました");

    let user_repository: Arc<dyn UserRepository> = Arc::new(PostgresUserRepository::new(pool));

    let app = build_app(&config, session_manager, user_repository);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("ホストとポートの形式が不正です");

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Web サーバーを起動しました: http://{addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
