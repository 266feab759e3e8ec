//! # Web サーバー設定
//!
//! 環境変数からサーバー・データストア・セッションの設定を読み込む。
//!
//! ## 環境変数一覧
//!
//! | 変数 | 必須 | デフォルト | 説明 |
//! |-----|------|----------|------|
//! | `WEB_HOST` | - | `0.0.0.0` | バインドするホスト |
//! | `WEB_PORT` | - | `3000` | バインドするポート |
//! | `DATABASE_URL` | ○ | - | PostgreSQL 接続 URL |
//! | `REDIS_URL` | ○ | - | Redis 接続 URL |
//! | `SESSION_COOKIE_NAME` | - | `id` | セッション Cookie 名 |
//! | `SESSION_MAX_AGE` | - | `180` | セッションの有効期限（秒） |
//! | `SESSION_RESAVE` | - | `true` | アクセスごとに TTL を延長するか |
//! | `SESSION_SAVE_UNINITIALIZED` | - | `false` | 匿名セッションを永続化するか |
//! | `ENV` | - | - | `production` で本番モード |

use anyhow::Context as _;

/// Web サーバー全体の設定
#[derive(Debug, Clone)]
pub struct WebConfig {
    pub host:         String,
    pub port:         u16,
    pub database_url: String,
    pub redis_url:    String,
    /// 本番モードかどうか（`ENV=production`）。
    /// エラーページの詳細表示を抑制する
    pub production:   bool,
    pub session:      SessionConfig,
}

/// セッション Cookie とストアの設定
///
/// Cookie の max-age とセッションストアの TTL は同じ値を使用し、
/// Cookie だけが生き残る・ストアだけが生き残るという不整合を避ける。
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// セッション Cookie 名。用途を推測されないよう無難な名前にしている
    pub cookie_name:        String,
    /// セッションの有効期限（秒）
    pub max_age_seconds:    i64,
    /// アクセスごとにセッションを保存し直して TTL を延長するか
    pub resave:             bool,
    /// 未ログインの訪問者にもセッションを発行するか
    pub save_uninitialized: bool,
    /// Cookie に Secure 属性を付与するか（本番モードで有効）
    pub secure:             bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name:        "id".to_string(),
            max_age_seconds:    180,
            resave:             true,
            save_uninitialized: false,
            secure:             false,
        }
    }
}

impl WebConfig {
    /// 環境変数から設定を読み込む
    ///
    /// # エラー
    ///
    /// 必須の環境変数が未設定、または値がパースできない場合。
    pub fn from_env() -> anyhow::Result<Self> {
        let host = std::env::var("WEB_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = std::env::var("WEB_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .context("WEB_PORT は数値である必要があります")?;

        let database_url =
            std::env::var("DATABASE_URL").context("DATABASE_URL が設定されていません")?;

        let redis_url = std::env::var("REDIS_URL").context("REDIS_URL が設定されていません")?;

        // 本番モードの判定は起動時の一度きり。以降は設定として引き回す
        let production = std::env::var("ENV").is_ok_and(|v| v == "production");

        Ok(Self {
            host,
            port,
            database_url,
            redis_url,
            production,
            session: SessionConfig::from_env(production)?,
        })
    }
}

impl SessionConfig {
    /// 環境変数から設定を読み込む（未設定の項目はデフォルト値）
    pub fn from_env(production: bool) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let cookie_name =
            std::env::var("SESSION_COOKIE_NAME").unwrap_or(defaults.cookie_name);

        let max_age_seconds = match std::env::var("SESSION_MAX_AGE") {
            Ok(value) => parse_max_age(&value)?,
            Err(_) => defaults.max_age_seconds,
        };

        let resave = match std::env::var("SESSION_RESAVE") {
            Ok(value) => parse_bool("SESSION_RESAVE", &value)?,
            Err(_) => defaults.resave,
        };

        let save_uninitialized = match std::env::var("SESSION_SAVE_UNINITIALIZED") {
            Ok(value) => parse_bool("SESSION_SAVE_UNINITIALIZED", &value)?,
            Err(_) => defaults.save_uninitialized,
        };

        Ok(Self {
            cookie_name,
            max_age_seconds,
            resave,
            save_uninitialized,
            secure: production,
        })
    }
}

fn parse_max_age(value: &str) -> anyhow::Result<i64> {
    let seconds = value
        .parse::<i64>()
        .context("SESSION_MAX_AGE は数値である必要があります")?;

    anyhow::ensure!(seconds > 0, "SESSION_MAX_AGE は正の数である必要があります");

    Ok(seconds)
}

fn parse_bool(name: &str, value: &str) -> anyhow::Result<bool> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        other => anyhow::bail!("{name} は true / false のいずれかです: {other:?}"),
    }
}
