/*
 * Responsibility
 * - GET /login (login form contract), POST /login (issue the session cookie), GET /logout
 * - The only place tokens are issued; the gate only ever reads them
 */
use axum::{
    Form, Json,
    extract::State,
    response::Redirect,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{error, info, warn};

use crate::api::dto::session::{LoginFormResponse, LoginRequest};
use crate::error::AppError;
use crate::middleware::auth::gate::{HOME_PATH, LOGIN_PATH};
use crate::state::AppState;

pub async fn login_form() -> Json<LoginFormResponse> {
    Json(LoginFormResponse {
        action: LOGIN_PATH,
        method: "POST",
        fields: ["email", "password"],
    })
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(req): Form<LoginRequest>,
) -> Result<(CookieJar, Redirect), AppError> {
    if let Err(reason) = req.validate() {
        warn!(email = %req.email, reason, "rejected login form");
        return Ok((state.cookie.clear(jar), Redirect::to(LOGIN_PATH)));
    }

    let identity = match state.directory.authenticate(&req.email, &req.password).await {
        Some(identity) => identity,
        None => {
            warn!(email = %req.email, "invalid login");
            return Ok((state.cookie.clear(jar), Redirect::to(LOGIN_PATH)));
        }
    };

    // Login cannot proceed without a token; the client only sees a generic error.
    let token = state.sessions.issue(&identity).await.map_err(|e| {
        error!(email = %identity, error = %e, "failed to issue session token");
        AppError::from(e)
    })?;

    info!(email = %identity, "login succeeded");
    Ok((state.cookie.store(jar, token), Redirect::to(HOME_PATH)))
}

pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    (state.cookie.clear(jar), Redirect::to("/"))
}
