//! Shared fixtures for router and gate tests.

use std::num::NonZeroU32;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, header},
};

use crate::middleware::auth::carrier::SessionCookie;
use crate::services::directory::StaticDirectory;
use crate::services::session::{SessionPolicy, SessionService, TokenCodec};
use crate::state::AppState;

pub const COOKIE_NAME: &str = "jnjSession";
const SECRET: &str = "test-secret";

// Low iteration count keeps the suite fast; the envelope format is unchanged.
fn codec(secret: &str) -> TokenCodec {
    TokenCodec::new(secret, NonZeroU32::new(8).unwrap())
}

pub fn state_with(secret: &str, allow_anonymous: bool) -> AppState {
    let sessions = SessionService::new(
        codec(secret),
        SessionPolicy {
            nonce_marker: "dfac5be1ee95".to_string(),
            max_age: None,
            max_concurrent_crypto: 4,
        },
    );
    let directory = StaticDirectory::default().with_user("ops@desk.io", "hunter2");

    AppState::new(
        Arc::new(sessions),
        Arc::new(directory),
        SessionCookie::new(COOKIE_NAME, 3600, false),
        allow_anonymous,
    )
}

pub fn state_with_secret(secret: &str) -> AppState {
    state_with(secret, false)
}

pub fn state() -> AppState {
    state_with_secret(SECRET)
}

/// Token a browser would hold after logging in against `state()`.
pub async fn token_for(identity: &str) -> String {
    state().sessions.issue(identity).await.unwrap()
}

pub fn request_with_cookie(path: &str, value: &str) -> Request<Body> {
    Request::get(path)
        .header(header::COOKIE, format!("{COOKIE_NAME}={value}"))
        .body(Body::empty())
        .unwrap()
}
