//! Per-route authorization pipeline over the session cookie.
//!
//! Every guarded request is classified exactly once (Anonymous or
//! Authenticated) by opening the cookie with `SessionService`. The route's
//! ordered list of [`Policy`] values is then evaluated against that
//! classification; the first policy that does not answer
//! [`Decision::Proceed`] ends the request before the handler runs.
//!
//! On `Proceed`, an authenticated caller's `SessionCtx` is inserted into the
//! request extensions for the extractors.
//!
//! ```ignore
//! Router::new()
//!     .route("/dashboard", gate::guard(get(dashboard), &state, &[Policy::RequireAuthenticated]))
//! ```

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
    routing::MethodRouter,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

use crate::api::extractors::SessionCtx;
use crate::error::AppError;
use crate::services::session::{Classification, CredentialError};
use crate::state::AppState;

/// Login entry point; anonymous callers of protected pages are sent here.
pub const LOGIN_PATH: &str = "/login";
/// Where already-authenticated callers of the login page are sent.
pub const HOME_PATH: &str = "/dashboard";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Anonymous -> clear the cookie and redirect to login.
    RequireAuthenticated,
    /// Never blocks; attaches the identity when there is one.
    PassThroughIdentity,
    /// Authenticated -> redirect home (login-style pages).
    RejectIfAlreadyAuthenticated,
    /// Anonymous -> 401 without a redirect (XHR-style endpoints).
    DenyAnonymous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Proceed,
    Redirect {
        location: &'static str,
        clear_credential: bool,
    },
    Deny,
}

impl Policy {
    pub fn name(self) -> &'static str {
        match self {
            Self::RequireAuthenticated => "require_authenticated",
            Self::PassThroughIdentity => "pass_through_identity",
            Self::RejectIfAlreadyAuthenticated => "reject_if_already_authenticated",
            Self::DenyAnonymous => "deny_anonymous",
        }
    }

    pub fn decide(self, classification: &Classification) -> Decision {
        match (self, classification.is_authenticated()) {
            (Self::RequireAuthenticated, false) => Decision::Redirect {
                location: LOGIN_PATH,
                clear_credential: true,
            },
            (Self::RejectIfAlreadyAuthenticated, true) => Decision::Redirect {
                location: HOME_PATH,
                clear_credential: false,
            },
            (Self::DenyAnonymous, false) => Decision::Deny,
            _ => Decision::Proceed,
        }
    }
}

/// First non-`Proceed` decision wins; an empty pipeline proceeds.
pub fn evaluate(policies: &[Policy], classification: &Classification) -> (Decision, Option<Policy>) {
    policies
        .iter()
        .map(|&policy| (policy.decide(classification), Some(policy)))
        .find(|(decision, _)| *decision != Decision::Proceed)
        .unwrap_or((Decision::Proceed, None))
}

fn session_state(classification: &Classification) -> &'static str {
    match classification {
        Classification::Authenticated(_) => "authenticated",
        Classification::Anonymous(CredentialError::NoCredential) => "no_credential",
        Classification::Anonymous(CredentialError::InvalidCredential) => "invalid_credential",
    }
}

#[derive(Clone)]
struct GateState {
    app: AppState,
    policies: Arc<[Policy]>,
}

/// Put a method router behind the given policy pipeline.
///
/// Only the methods already present on `route` are guarded; methods chained
/// afterwards (e.g. `.post(login)`) are not.
pub fn guard(
    route: MethodRouter<AppState>,
    state: &AppState,
    policies: &[Policy],
) -> MethodRouter<AppState> {
    let gate = GateState {
        app: state.clone(),
        policies: Arc::from(policies),
    };

    // axum 0.8 from_fn cannot take a State extractor, so pass it explicitly with from_fn_with_state
    route.route_layer(middleware::from_fn_with_state(gate, gate_middleware))
}

async fn gate_middleware(
    State(gate): State<GateState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let jar = CookieJar::from_headers(req.headers());
    let credential = gate.app.cookie.read(&jar);
    let classification = gate.app.sessions.classify(credential.as_deref()).await;

    let (decision, policy) = evaluate(&gate.policies, &classification);
    match decision {
        Decision::Proceed => {}
        Decision::Redirect {
            location,
            clear_credential,
        } => {
            debug!(
                path = %req.uri().path(),
                policy = policy.map(Policy::name),
                identity = classification.identity(),
                session = session_state(&classification),
                location,
                "session gate redirected request"
            );
            if clear_credential {
                return (gate.app.cookie.clear(jar), Redirect::to(location)).into_response();
            }
            return Redirect::to(location).into_response();
        }
        Decision::Deny => {
            debug!(
                path = %req.uri().path(),
                policy = policy.map(Policy::name),
                session = session_state(&classification),
                "session gate denied request"
            );
            return AppError::Unauthorized.into_response();
        }
    }

    if let Classification::Authenticated(claim) = &classification {
        // middleware -> extractor
        req.extensions_mut().insert(SessionCtx::from_claim(claim));
    }

    next.run(req).await
}
