//! # Web 層エラー定義
//!
//! ハンドラのエラーを HTTP レスポンスに変換する。
//!
//! ## 2 種類のエラー
//!
//! | 型 | レスポンス形式 | 用途 |
//! |---|--------------|------|
//! | [`PageError`] | HTML（エラーページ） | ブラウザ向けページハンドラ |
//! | [`ApiError`] | JSON（RFC 9457） | サインアップ API |
//!
//! ## 内部情報の露出制御
//!
//! 500 エラーの詳細（SQL エラーメッセージ等）は開発時のデバッグには
//! 有用だが、本番では攻撃の手がかりになる。本番モードの判定は起動時に
//! [`WebConfig`](crate::config::WebConfig) へ読み込まれ、
//! [`render_error_pages`] ミドルウェアが詳細の表示可否を決める。
//! ハンドラの `IntoResponse` はエラー内容を response extensions に
//! 載せるだけで、描画はミドルウェアに集約される。

use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Html, IntoResponse, Response},
};
use monban_domain::DomainError;
use monban_infra::InfraError;
use monban_shared::error_response::ErrorResponse;
use thiserror::Error;

use crate::view;

/// HTML ページを返すハンドラのエラー
///
/// `IntoResponse` 実装がエラーページの描画まで行うため、
/// ハンドラは `?` で伝播するだけでよい。
#[derive(Debug, Error)]
pub enum PageError {
    /// 404 Not Found（ルーターのフォールバックからも使用される）
    #[error("ページが見つかりません")]
    NotFound,

    /// 500 Internal Server Error
    #[error("内部エラー: {detail}")]
    Internal {
        /// エラーの詳細（本番環境ではページに表示されない）
        detail: String,
    },
}

impl PageError {
    /// 任意のエラーから 500 エラーを作成する
    pub fn internal(e: impl std::fmt::Display) -> Self {
        Self::Internal {
            detail: e.to_string(),
        }
    }
}

impl From<InfraError> for PageError {
    fn from(e: InfraError) -> Self {
        Self::internal(e)
    }
}

impl From<tera::Error> for PageError {
    fn from(e: tera::Error) -> Self {
        Self::Internal {
            detail: format!("テンプレートの描画に失敗しました: {e}"),
        }
    }
}

/// エラーページの描画内容
///
/// ハンドラの `IntoResponse` から [`render_error_pages`] ミドルウェアへ
/// response extensions 経由で引き渡される。
#[derive(Debug, Clone)]
pub(crate) struct ErrorPage {
    message: &'static str,
    detail:  Option<String>,
}

/// エラーページ描画ミドルウェアの状態
#[derive(Clone)]
pub struct ErrorPageState {
    pub production: bool,
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let (status, page) = match self {
            Self::NotFound => (
                StatusCode::NOT_FOUND,
                ErrorPage {
                    message: "ページが見つかりません",
                    detail:  None,
                },
            ),
            Self::Internal { detail } => {
                tracing::error!(detail = %detail, "内部エラーが発生しました");

                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorPage {
                        message: "内部エラーが発生しました",
                        detail:  Some(detail),
                    },
                )
            }
        };

        let mut response = status.into_response();
        response.extensions_mut().insert(page);

        response
    }
}

/// エラーページを描画するミドルウェア
///
/// [`PageError`] が response extensions に載せた [`ErrorPage`] を
/// エラービューとして描画する。本番モードでは詳細を表示しない。
pub async fn render_error_pages(
    State(state): State<ErrorPageState>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;

    let Some(page) = response.extensions_mut().remove::<ErrorPage>() else {
        return response;
    };

    let detail = if state.production { None } else { page.detail };

    render_error_page(response.status(), page.message, detail)
}

/// エラーページを描画する
///
/// エラーページ自体の描画に失敗した場合はプレーンテキストにフォールバックする。
pub(crate) fn render_error_page(
    status: StatusCode,
    message: &str,
    detail: Option<String>,
) -> Response {
    let mut context = tera::Context::new();
    context.insert("status", &status.as_u16());
    context.insert("message", message);
    context.insert("detail", &detail);

    match view::renderer().render("error.html", &context) {
        Ok(body) => (status, Html(body)).into_response(),
        Err(e) => {
            tracing::error!("エラーページの描画に失敗しました: {e}");
            (status, message.to_string()).into_response()
        }
    }
}

/// JSON を返すエンドポイントのエラー
#[derive(Debug, Error)]
pub enum ApiError {
    /// 400 Bad Request
    #[error("{0}")]
    Validation(String),

    /// 409 Conflict（メールアドレスの重複登録）
    #[error("{0}")]
    Conflict(String),

    /// 500 Internal Server Error
    #[error("内部エラーが発生しました")]
    Internal(String),
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Validation(msg) => Self::Validation(msg),
            DomainError::Conflict(msg) => Self::Conflict(msg),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<InfraError> for ApiError {
    fn from(e: InfraError) -> Self {
        if e.as_conflict().is_some() {
            Self::Conflict("このメールアドレスは既に登録されています".to_string())
        } else {
            Self::Internal(e.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::Validation(detail) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::validation_error(detail),
            ),
            Self::Conflict(detail) => (StatusCode::CONFLICT, ErrorResponse::conflict(detail)),
            Self::Internal(detail) => {
                tracing::error!(detail = %detail, "内部エラーが発生しました");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::internal_error(),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_not_foundは404ページになる() {
        let response = PageError::NotFound.into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_infraエラーは500ページになる() {
        let response = PageError::from(InfraError::unexpected("boom")).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_internalのレスポンスは詳細をextensionsで運ぶ() {
        let response = PageError::internal("boom").into_response();

        let page = response.extensions().get::<ErrorPage>().unwrap();
        assert_eq!(page.detail.as_deref(), Some("boom"));
    }

    #[test]
    fn test_conflictエラーは409のapiエラーになる() {
        let error = ApiError::from(InfraError::conflict("User", "dup@example.com"));

        assert!(matches!(error, ApiError::Conflict(_)));
        assert_eq!(
            error.into_response().status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_バリデーションエラーは400のapiエラーになる() {
        let error = ApiError::from(DomainError::Validation("メールアドレスは必須です".into()));

        assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_その他のinfraエラーは500のapiエラーになる() {
        let error = ApiError::from(InfraError::unexpected("boom"));

        assert_eq!(
            error.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
