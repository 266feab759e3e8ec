//! # セッションミドルウェア
//!
//! 全リクエストでセッション Cookie を解決し、request extensions に
//! [`SessionContext`] と [`CurrentUser`] を注入する。
//!
//! ## 処理の流れ
//!
//! ```text
//! Cookie あり ──> ストアから取得 ──> あれば resave（TTL 延長）
//!      │                │
//!      │                └─ なければ匿名として扱う（期限切れ）
//!      └─ なし ──> save_uninitialized なら匿名セッションを発行
//!
//! payload あり ──> deserialize ──> CurrentUser(Some(user))
//! ```
//!
//! ## 障害時の方針
//!
//! セッションストアの障害でページ全体を落とさない。
//! 取得・保存に失敗した場合はログに記録し、匿名として処理を続行する。

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use monban_domain::user::User;
use monban_infra::{SessionData, SessionManager};

use crate::{auth::Authenticator, config::SessionConfig};

/// セッションミドルウェアの状態
#[derive(Clone)]
pub struct SessionLayerState {
    pub session_manager: Arc<dyn SessionManager>,
    pub authenticator:   Arc<Authenticator>,
    pub config:          SessionConfig,
}

/// リクエストに紐づくセッション
///
/// ハンドラから `Extension<SessionContext>` で取得できる。
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// セッション ID（ストアに存在しない場合は `None`）
    pub session_id: Option<String>,
    pub data:       SessionData,
}

/// リクエストに紐づく認証済みユーザー
///
/// 匿名セッション、またはセッションのユーザーが削除済みの場合は `None`。
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<User>);

/// セッションを解決して request extensions に注入するミドルウェア
///
/// `axum::middleware::from_fn_with_state` でルーター全体に適用する。
pub async fn attach_session(
    State(state): State<SessionLayerState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let mut jar = jar;

    let cookie_value = jar
        .get(&state.config.cookie_name)
        .map(|c| c.value().to_string());

    let mut context = None;

    if let Some(session_id) = cookie_value {
        match state.session_manager.get(&session_id).await {
            Ok(Some(mut data)) => {
                if state.config.resave {
                    // アクセスのたびに保存し直し、TTL をスライドさせる
                    data.touch();
                    if let Err(e) = state.session_manager.save(&session_id, &data).await {
                        tracing::warn!("セッションの再保存に失敗しました: {e}");
                    }
                }

                context = Some(SessionContext {
                    session_id: Some(session_id),
                    data,
                });
            }
            // ストアに存在しない（期限切れまたは削除済み）Cookie は無視する
            Ok(None) => {}
            Err(e) => {
                tracing::error!("セッションの取得に失敗しました: {e}");
            }
        }
    }

    let context = match context {
        Some(context) => context,
        None => anonymous_context(&state, &mut jar).await,
    };

    let current_user = match context.data.payload() {
        Some(payload) => match state.authenticator.deserialize_user(payload).await {
            Ok(user) => CurrentUser(user),
            Err(e) => {
                tracing::error!("セッションからのユーザー復元に失敗しました: {e}");
                CurrentUser(None)
            }
        },
        None => CurrentUser(None),
    };

    request.extensions_mut().insert(context);
    request.extensions_mut().insert(current_user);

    let response = next.run(request).await;

    (jar, response).into_response()
}

/// 匿名セッションのコンテキストを作成する
///
/// `save_uninitialized` が有効な場合はストアに永続化して Cookie を発行する。
async fn anonymous_context(state: &SessionLayerState, jar: &mut CookieJar) -> SessionContext {
    let data = SessionData::anonymous();

    if !state.config.save_uninitialized {
        return SessionContext {
            session_id: None,
            data,
        };
    }

    match state.session_manager.create(&data).await {
        Ok(session_id) => {
            *jar = jar
                .clone()
                .add(build_session_cookie(&state.config, &session_id));

            SessionContext {
                session_id: Some(session_id),
                data,
            }
        }
        Err(e) => {
            tracing::warn!("匿名セッションの作成に失敗しました: {e}");
            SessionContext {
                session_id: None,
                data,
            }
        }
    }
}

/// セッション Cookie を構築する
///
/// HttpOnly を必ず付与し、JavaScript からセッション ID を読めなくする。
/// 本番モードの設定では Secure も付与する。
pub fn build_session_cookie(config: &SessionConfig, session_id: &str) -> Cookie<'static> {
    let builder = Cookie::build((config.cookie_name.clone(), session_id.to_string()))
        .path("/")
        .max_age(time::Duration::seconds(config.max_age_seconds))
        .http_only(true)
        .same_site(SameSite::Lax);

    let builder = if config.secure {
        builder.secure(true)
    } else {
        builder
    };

    builder.build()
}

/// セッション Cookie を削除する Cookie を構築する（ログアウト時）
pub fn build_clear_cookie(config: &SessionConfig) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), ""))
        .path("/")
        .max_age(time::Duration::ZERO)
        .http_only(true)
        .build()
}
