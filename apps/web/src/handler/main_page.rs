//! ランディングページ

use std::sync::Arc;

use axum::{extract::State, response::Html};

use crate::{error::PageError, handler::PageState, view};

/// GET /
///
/// 登録済みの会員数を添えてランディングページを表示する。
/// データストアに到達できない場合は 500 エラーページになる。
pub async fn main_page(State(state): State<Arc<PageState>>) -> Result<Html<String>, PageError> {
    let member_count = state.user_repository.count().await?;

    let mut context = tera::Context::new();
    context.insert("member_count", &member_count);

    let body = view::renderer().render("index.html", &context)?;

    Ok(Html(body))
}
