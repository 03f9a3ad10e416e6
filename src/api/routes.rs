/*
 * Responsibility
 * - URL -> handler mapping
 * - Each route declares its own gate pipeline; nothing is guarded by default
 */
use axum::{Router, routing::get};

use crate::api::handlers::{auth, health, pages};
use crate::middleware::auth::gate::{Policy, guard};
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(pages::index))
        .route("/health", get(health::health))
        // Only GET is guarded; the login POST must stay reachable for anonymous callers
        .route(
            "/login",
            guard(
                get(auth::login_form),
                &state,
                &[Policy::RejectIfAlreadyAuthenticated],
            )
            .post(auth::login),
        )
        .route("/logout", get(auth::logout))
        .route(
            "/dashboard",
            guard(get(pages::dashboard), &state, &[Policy::RequireAuthenticated]),
        )
        .route(
            "/whoami",
            guard(get(pages::whoami), &state, &[Policy::PassThroughIdentity]),
        )
        .route(
            "/api/session",
            guard(get(pages::session), &state, &[Policy::DenyAnonymous]),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::auth::gate::{HOME_PATH, LOGIN_PATH};
    use crate::test_support;
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
        response::Response,
    };
    use tower::ServiceExt;

    fn app(state: AppState) -> Router {
        routes(state.clone()).with_state(state)
    }

    fn login_request(body: &'static str) -> Request<Body> {
        Request::post("/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    // `name=value; Path=/; ...` -> `value`
    fn cookie_value(response: &Response) -> String {
        let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        let pair = set_cookie.split(';').next().unwrap();
        let (_, value) = pair.split_once('=').unwrap();
        value.to_string()
    }

    #[tokio::test]
    async fn health_is_public() {
        let response = app(test_support::state())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"ok");
    }

    #[tokio::test]
    async fn login_then_dashboard() {
        let app = app(test_support::state());

        let response = app
            .clone()
            .oneshot(login_request("email=ops%40desk.io&password=hunter2"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], HOME_PATH);
        let token = cookie_value(&response);
        assert!(!token.is_empty());

        let response = app
            .clone()
            .oneshot(test_support::request_with_cookie("/dashboard", &token))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["authenticated"], true);
        assert_eq!(body["email"], "ops@desk.io");

        let response = app
            .oneshot(test_support::request_with_cookie("/api/session", &token))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["email"], "ops@desk.io");
        assert!(body["issued_at"].is_string());
    }

    #[tokio::test]
    async fn bad_password_clears_cookie_and_returns_to_login() {
        let response = app(test_support::state())
            .oneshot(login_request("email=ops%40desk.io&password=wrong"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], LOGIN_PATH);
        let cleared = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cleared.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn empty_login_form_returns_to_login() {
        let response = app(test_support::state())
            .oneshot(login_request(""))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], LOGIN_PATH);
    }

    #[tokio::test]
    async fn login_page_sends_authenticated_callers_home() {
        let token = test_support::token_for("ops@desk.io").await;

        let response = app(test_support::state())
            .oneshot(test_support::request_with_cookie("/login", &token))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], HOME_PATH);
    }

    #[tokio::test]
    async fn login_page_is_served_to_anonymous_callers() {
        let response = app(test_support::state())
            .oneshot(Request::get("/login").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["action"], LOGIN_PATH);
    }

    #[tokio::test]
    async fn dashboard_redirects_anonymous_callers() {
        let response = app(test_support::state())
            .oneshot(Request::get("/dashboard").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], LOGIN_PATH);
    }

    #[tokio::test]
    async fn whoami_follows_allow_anonymous() {
        let strict = app(test_support::state())
            .oneshot(Request::get("/whoami").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(strict.status(), StatusCode::SEE_OTHER);
        assert_eq!(strict.headers()[header::LOCATION], LOGIN_PATH);

        let relaxed = app(test_support::state_with("test-secret", true))
            .oneshot(Request::get("/whoami").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(relaxed.status(), StatusCode::OK);
        let body = body_json(relaxed).await;
        assert_eq!(body["authenticated"], false);
        assert!(body["email"].is_null());

        let token = test_support::token_for("ops@desk.io").await;
        let known = app(test_support::state())
            .oneshot(test_support::request_with_cookie("/whoami", &token))
            .await
            .unwrap();
        assert_eq!(body_json(known).await["email"], "ops@desk.io");
    }

    #[tokio::test]
    async fn api_session_is_401_for_anonymous_callers() {
        let response = app(test_support::state())
            .oneshot(test_support::request_with_cookie("/api/session", "garbage"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"]["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn logout_clears_cookie() {
        let response = app(test_support::state())
            .oneshot(Request::get("/logout").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");
        assert!(
            response.headers()[header::SET_COOKIE]
                .to_str()
                .unwrap()
                .contains("Max-Age=0")
        );
    }
}
