//! # HTTP ハンドラ
//!
//! ページごとのハンドラと、ハンドラが依存する状態構造体を定義する。
//!
//! ## 状態の分割
//!
//! ルーターごとに必要な依存だけを持つ状態構造体を分け、
//! ハンドラのテストで不要な依存を組み立てずに済むようにする。

pub mod health;
pub mod home;
pub mod login;
pub mod main_page;
pub mod profile;
pub mod signup;

use std::sync::Arc;

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use monban_infra::{PasswordHasher, SessionManager, UserRepository};

use crate::{auth::Authenticator, config::SessionConfig, error::PageError};

/// ログイン・ログアウト用の状態
pub struct AuthState {
    pub authenticator:   Arc<Authenticator>,
    pub session_manager: Arc<dyn SessionManager>,
    pub user_repository: Arc<dyn UserRepository>,
    pub session_config:  SessionConfig,
}

/// サインアップ用の状態
pub struct SignupState {
    pub user_repository: Arc<dyn UserRepository>,
    pub password_hasher: Arc<dyn PasswordHasher>,
}

/// ページ表示用の状態
pub struct PageState {
    pub user_repository: Arc<dyn UserRepository>,
}

/// 302 Found リダイレクトを構築する
///
/// フォーム POST 後の遷移もブラウザの挙動に合わせて 302 で統一する。
pub(crate) fn redirect_found(location: &str) -> Response {
    (
        StatusCode::FOUND,
        [(header::LOCATION, location.to_string())],
    )
        .into_response()
}

/// ルーターのフォールバック（未定義パスは 404 エラーページ）
pub async fn not_found() -> PageError {
    PageError::NotFound
}

#[cfg(test)]
pub(crate) mod test_helper {
    use axum::{Router, body::Body, http::Request, response::Response};
    use monban_domain::{
        password::PasswordHash,
        user::{Email, User, UserId, UserName},
    };
    use monban_infra::mock::{MockSessionManager, MockUserRepository};

    use super::*;
    use crate::{
        app_builder::build_app,
        config::{SessionConfig, WebConfig},
    };

    // password123 のハッシュ
    pub(crate) const TEST_HASH: &str = "$argon2id$v=19$m=65536,t=1,p=1$olntqw+EoVpwH4B1vUAI0A$5yCA1izLODgz8nQOInDGwbuQB/AS0sIQDwpmIilve5M";

    pub(crate) fn test_config() -> WebConfig {
        WebConfig {
            host:         "127.0.0.1".to_string(),
            port:         0,
            database_url: String::new(),
            redis_url:    String::new(),
            production:   false,
            session:      SessionConfig::default(),
        }
    }

    /// 本番モード相当の設定（エラー詳細の抑制と Secure Cookie）
    pub(crate) fn production_config() -> WebConfig {
        WebConfig {
            production: true,
            session: SessionConfig {
                secure: true,
                ..SessionConfig::default()
            },
            ..test_config()
        }
    }

    /// モックを差し込んだテスト用アプリを構築する
    pub(crate) fn build_test_app(
        repo: MockUserRepository,
        sessions: MockSessionManager,
    ) -> Router {
        build_app(&test_config(), Arc::new(sessions), Arc::new(repo))
    }

    /// 本番モード設定のテスト用アプリを構築する
    pub(crate) fn build_production_test_app(
        repo: MockUserRepository,
        sessions: MockSessionManager,
    ) -> Router {
        build_app(&production_config(), Arc::new(sessions), Arc::new(repo))
    }

    /// テスト用シードユーザー（alice / password123）
    pub(crate) fn seeded_user() -> (User, PasswordHash) {
        let user = User::new(
            UserId::new(),
            Email::new("alice@example.com").unwrap(),
            UserName::new("Alice").unwrap(),
            chrono::Utc::now(),
        );

        (user, PasswordHash::new(TEST_HASH))
    }

    /// フォーム POST リクエストを構築する
    pub(crate) fn form_post(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    /// Cookie 付き GET リクエストを構築する
    pub(crate) fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
        Request::builder()
            .method("GET")
            .uri(uri)
            .header("cookie", format!("id={cookie}"))
            .body(Body::empty())
            .unwrap()
    }

    /// Set-Cookie ヘッダーからセッション ID を取り出す
    pub(crate) fn session_cookie_value(response: &Response) -> Option<String> {
        let header = response.headers().get("set-cookie")?.to_str().ok()?;
        let (name_value, _) = header.split_once(';')?;
        let (name, value) = name_value.split_once('=')?;

        (name == "id" && !value.is_empty()).then(|| value.to_string())
    }

    /// レスポンスボディを文字列として読み出す
    pub(crate) async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        String::from_utf8(bytes.to_vec()).unwrap()
    }
}
