//! # アプリケーションビルダー
//!
//! 依存の組み立てとルーターツリーの構築を行う。
//!
//! ## ルーターツリー
//!
//! ```text
//! /
//! ├── GET  /            ランディングページ（会員数表示）
//! ├── GET  /health      ヘルスチェック
//! ├── GET  /profile     プロフィール（要ログイン）
//! ├── GET  /logout      ログアウト
//! ├── /login
//! │   ├── GET  /        ログインフォーム
//! │   └── POST /        ログイン実行
//! ├── /signup
//! │   ├── GET  /        サインアップフォーム
//! │   └── POST /confirmParticulars  登録実行
//! ├── /home
//! │   └── GET  /        ホーム（要ログイン）
//! └── fallback          404 エラーページ
//! ```
//!
//! ## ミドルウェア
//!
//! リクエスト ID の付与 → トレーシングスパン → セッション解決 →
//! エラーページ描画の順に全ルートへ適用する。

use std::sync::Arc;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use monban_infra::{
    Argon2PasswordChecker,
    Argon2PasswordHasher,
    PasswordChecker,
    PasswordHasher,
    SessionManager,
    UserRepository,
};
use monban_shared::observability::{MakeRequestUuidV7, make_request_span};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{
    auth::{Authenticator, LocalStrategy},
    config::WebConfig,
    error::{ErrorPageState, render_error_pages},
    handler::{
        AuthState,
        PageState,
        SignupState,
        health::health_check,
        home::home,
        login::{login, login_form, logout},
        main_page::main_page,
        not_found,
        profile::profile,
        signup::{confirm_particulars, signup_form},
    },
    middleware::{SessionLayerState, attach_session},
};

/// アプリケーションのルーターを構築する
///
/// セッションマネージャとリポジトリを引数で受け取ることで、
/// テストではモック実装に差し替えられる。
pub fn build_app(
    config: &WebConfig,
    session_manager: Arc<dyn SessionManager>,
    user_repository: Arc<dyn UserRepository>,
) -> Router {
    let password_checker: Arc<dyn PasswordChecker> = Arc::new(Argon2PasswordChecker::new());
    let password_hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2PasswordHasher::new());

    let authenticator = Arc::new(
        Authenticator::new(user_repository.clone()).register(
            "local",
            Arc::new(LocalStrategy::new(
                user_repository.clone(),
                password_checker,
            )),
        ),
    );

    let error_page_state = ErrorPageState {
        production: config.production,
    };

    let session_layer_state = SessionLayerState {
        session_manager: session_manager.clone(),
        authenticator:   authenticator.clone(),
        config:          config.session.clone(),
    };

    let auth_state = Arc::new(AuthState {
        authenticator,
        session_manager,
        user_repository: user_repository.clone(),
        session_config: config.session.clone(),
    });

    let signup_state = Arc::new(SignupState {
        user_repository: user_repository.clone(),
        password_hasher,
    });

    let page_state = Arc::new(PageState { user_repository });

    let login_routes = Router::new()
        .route("/", get(login_form).post(login))
        .with_state(auth_state.clone());

    let signup_routes = Router::new()
        .route("/", get(signup_form))
        .route("/confirmParticulars", post(confirm_particulars))
        .with_state(signup_state);

    let home_routes = Router::new().route("/", get(home));

    let page_routes = Router::new()
        .route("/", get(main_page))
        .route("/profile", get(profile))
        .with_state(page_state);

    let logout_routes = Router::new()
        .route("/logout", get(logout))
        .with_state(auth_state);

    Router::new()
        .route("/health", get(health_check))
        .nest("/login", login_routes)
        .nest("/signup", signup_routes)
        .nest("/home", home_routes)
        .merge(page_routes)
        .merge(logout_routes)
        .fallback(not_found)
        .layer(from_fn_with_state(error_page_state, render_error_pages))
        .layer(from_fn_with_state(session_layer_state, attach_session))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
}
