//! プロフィールページ（要ログイン）

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

/// GET /profile
///
/// ログイン中のユーザー自身の登録情報を表示する。
/// 未ログインなら /login へ 302 リダイレクトする。
pub async fn profile(
    Extension(current_user): Extension<CurrentUser>,
) -> Result<Response, PageError> {
    let Some(user) = current_user.0 else {
        return Ok(redirect_found("/login"));
    };

    let mut context = tera::Context::new();
    context.insert("user_name", user.name().as_str());
    context.insert("email", user.email().as_str());
    context.insert(
        "created_at",
        &user.created_at().format("%Y-%m-%d").to_string(),
    );
    context.insert(
        "last_login_at",
        &user
            .last_login_at()
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string()),
    );

    let body = view::renderer().render("profile.html", &context)?;

    Ok(Html(body).into_response())
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::Request};
    use monban_infra::mock::{MockSessionManager, MockUserRepository};
    use pretty_assertions::assert_eq;
    use tower::ServiceExt as _;

    use crate::handler::test_helper::{
        body_string,
        build_test_app,
        form_post,
        get_with_cookie,
        seeded_user,
        session_cookie_value,
    };

    #[tokio::test]
    async fn test_ログイン済みなら登録情報を表示する() {
        // Given
        let repo = MockUserRepository::new();
        let (user, hash) = seeded_user();
        repo.add_user(user, hash);

        let sut = build_test_app(repo, MockSessionManager::default());

        let login_response = sut
            .clone()
            .oneshot(form_post(
                "/login",
                "email=alice%40example.com&password=password123",
            ))
            .await
            .unwrap();
        let session_id = session_cookie_value(&login_response).unwrap();

        // When
        let response = sut
            .oneshot(get_with_cookie("/profile", &session_id))
            .await
            .unwrap();

        // Then
        assert_eq!(response.status(), 200);

        let body = body_string(response).await;
        assert!(body.contains("Alice"));
        assert!(body.contains("alice@example.com"));
    }

    #[tokio::test]
    async fn test_未ログインならloginへリダイレクトする() {
        let sut = build_test_app(MockUserRepository::new(), MockSessionManager::default());

        let response = sut
            .oneshot(
                Request::builder()
                    .uri("/profile")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), 302);
        assert_eq!(response.headers().get("location").unwrap(), "/login");
    }
}
