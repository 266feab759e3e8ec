//! ホームページ（要ログイン）

use axum::{
    Extension,
    response::{Html, IntoResponse, Response},
};

use crate::{
    error::PageError,
    handler::redirect_found,
    middleware::CurrentUser,
    view,
};

/// GET /home
///
/// ログイン済みならホームページを表示し、未ログインなら
/// /login へ 302 リダイレクトする。
pub async fn home(Extension(current_user): Extension<CurrentUser>) -> Result<Response, PageError> {
    let Some(user) = current_user.0 else {
        return Ok(redirect_found("/login"));
    };

    let mut context = tera::Context::new();
    context.insert("user_name", user.name().as_str());

    let body = view::renderer().render("home.html", &context)?;

    Ok(Html(body).into_response())
}
