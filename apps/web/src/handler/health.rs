//! ヘルスチェック

use axum::Json;
use monban_shared::health::HealthResponse;

/// GET /health
///
/// ロードバランサーの死活監視用。データストアには触れない。
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status:  "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::Request};
    use monban_infra::mock::{MockSessionManager, MockUserRepository};
    use pretty_assertions::assert_eq;
    use tower::ServiceExt as _;

    use crate::handler::test_helper::{body_string, build_test_app};

    #[tokio::test]
    async fn test_ヘルスチェックは200を返す() {
        let sut = build_test_app(MockUserRepository::new(), MockSessionManager::default());

        let response = sut
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), 200);

        let body = body_string(response).await;
        assert!(body.contains("healthy"));
    }
}
