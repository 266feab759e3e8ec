//! サインアップ

use std::sync::Arc;

use axum::{
    Form,
    Json,
    extract::State,
    response::Html,
};
use chrono::Utc;
use monban_domain::{
    password::PlainPassword,
    user::{Email, User, UserId, UserName},
};
use monban_shared::api_response::ApiResponse;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ApiError, PageError},
    handler::SignupState,
    view,
};

/// サインアップフォームの入力値
#[derive(Debug, Deserialize)]
pub struct SignupForm {
    pub email:    String,
    pub name:     String,
    pub password: String,
}

/// 登録結果として返す確認データ
///
/// 入力された内容をそのまま返す。パスワードは含めない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupConfirmation {
    pub email: String,
    pub name:  String,
}

/// GET /signup
pub async fn signup_form() -> Result<Html<String>, PageError> {
    let context = tera::Context::new();
    let body = view::renderer().render("signup.html", &context)?;

    Ok(Html(body))
}

/// POST /signup/confirmParticulars
///
/// 入力値を検証してユーザーを登録し、確認データを JSON で返す。
///
/// # エラー
///
/// - 入力値の検証失敗: 400
/// - メールアドレスの重複: 409
pub async fn confirm_particulars(
    State(state): State<Arc<SignupState>>,
    Form(form): Form<SignupForm>,
) -> Result<Json<ApiResponse<SignupConfirmation>>, ApiError> {
    let email = Email::new(form.email.clone())?;
    let name = UserName::new(form.name.clone())?;
    let password = PlainPassword::for_signup(form.password)?;

    let password_hash = state.password_hasher.hash(&password)?;
    let user = User::new(UserId::new(), email, name, Utc::now());

    state.user_repository.create(&user, &password_hash).await?;

    tracing::info!(user_id = %user.id(), "サインアップ成功");

    Ok(Json(ApiResponse::new(SignupConfirmation {
        email: form.email,
        name:  form.name,
    })))
}
