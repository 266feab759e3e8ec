//! ログイン・ログアウト

use std::sync::Arc;

use axum::{
    Form,
    extract::State,
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use monban_domain::password::PlainPassword;
use monban_infra::SessionData;
use serde::Deserialize;

use crate::{
    auth::{AuthError, Credentials},
    error::PageError,
    handler::{AuthState, redirect_found},
    middleware::session::{build_clear_cookie, build_session_cookie},
    view,
};

/// ログインフォームの入力値
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email:    String,
    pub password: String,
}

/// GET /login
pub async fn login_form() -> Result<Html<String>, PageError> {
    render_login_page(None)
}

/// POST /login
///
/// 認証に成功するとセッションを作成し、Cookie を添えて /home へ
/// 302 リダイレクトする。失敗時はエラーメッセージ付きのログイン
/// フォームを再表示する（ステータスは 200）。
pub async fn login(
    State(state): State<Arc<AuthState>>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, PageError> {
    let credentials = Credentials {
        email:    form.email,
        password: PlainPassword::new(form.password),
    };

    let user = match state.authenticator.authenticate("local", &credentials).await {
        Ok(user) => user,
        Err(AuthError::Failure(failure)) => {
            tracing::info!(email = %credentials.email, reason = ?failure, "ログイン失敗");
            return Ok(render_login_page(Some(failure.user_message()))?.into_response());
        }
        Err(AuthError::UnknownStrategy(name)) => {
            return Err(PageError::internal(format!(
                "未登録の認証ストラテジです: {name}"
            )));
        }
        Err(AuthError::Infra(e)) => return Err(PageError::from(e)),
    };

    // セッションにはユーザー ID のみを格納する
    let payload = state.authenticator.serialize_user(&user);
    let session_id = state
        .session_manager
        .create(&SessionData::authenticated(payload))
        .await?;

    // 最終ログイン日時の更新失敗でログイン自体は失敗させない
    if let Err(e) = state.user_repository.update_last_login(user.id()).await {
        tracing::warn!("最終ログイン日時の更新に失敗しました: {e}");
    }

    tracing::info!(user_id = %user.id(), "ログイン成功");

    let jar = jar.add(build_session_cookie(&state.session_config, &session_id));

    Ok((jar, redirect_found("/home")).into_response())
}

/// GET /logout
///
/// セッションをストアから削除し、Cookie を無効化してトップへ
/// 302 リダイレクトする。未ログインでも成功として扱う。
pub async fn logout(State(state): State<Arc<AuthState>>, jar: CookieJar) -> Response {
    if let Some(cookie) = jar.get(&state.session_config.cookie_name) {
        if let Err(e) = state.session_manager.delete(cookie.value()).await {
            // ストア障害でも Cookie の無効化は行う
            tracing::warn!("セッションの削除に失敗しました: {e}");
        }
    }

    let jar = jar.add(build_clear_cookie(&state.session_config));

    (jar, redirect_found("/")).into_response()
}

fn render_login_page(error: Option<&str>) -> Result<Html<String>, PageError> {
    let mut context = tera::Context::new();
    context.insert("error", &error);

    let body = view::renderer().render("login.html", &context)?;

    Ok(Html(body))
}
