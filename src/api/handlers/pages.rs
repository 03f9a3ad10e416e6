/*
 * Responsibility
 * - Identity-aware endpoints standing in for the rendered pages
 * - Route-specific decisions (e.g. allow_anonymous) are made here, not in the gate
 */
use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;

use crate::api::dto::session::{IdentityResponse, SessionResponse};
use crate::api::extractors::{MaybeSessionCtx, SessionCtxExtractor};
use crate::middleware::auth::gate::LOGIN_PATH;
use crate::state::AppState;

pub async fn index() -> impl IntoResponse {
    Json(json!({"login": LOGIN_PATH}))
}

pub async fn dashboard(SessionCtxExtractor(ctx): SessionCtxExtractor) -> Json<IdentityResponse> {
    Json(IdentityResponse {
        authenticated: true,
        email: Some(ctx.email),
    })
}

pub async fn whoami(
    State(state): State<AppState>,
    MaybeSessionCtx(ctx): MaybeSessionCtx,
) -> Response {
    match ctx {
        Some(ctx) => Json(IdentityResponse {
            authenticated: true,
            email: Some(ctx.email),
        })
        .into_response(),
        None if state.allow_anonymous => Json(IdentityResponse {
            authenticated: false,
            email: None,
        })
        .into_response(),
        None => Redirect::to(LOGIN_PATH).into_response(),
    }
}

pub async fn session(SessionCtxExtractor(ctx): SessionCtxExtractor) -> Json<SessionResponse> {
    let issued_at = ctx.issued_at_utc();

    Json(SessionResponse {
        email: ctx.email,
        issued_at,
    })
}
