use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::state::AppState;

use super::SessionCtx;

/// Extractor for handlers that need an authenticated caller.
/// Assumes the gate already inserted SessionCtx into request.extensions().
/// Missing -> 401 (route not guarded, or guarded with a permissive policy).
pub struct SessionCtxExtractor(pub SessionCtx);

impl FromRequestParts<AppState> for SessionCtxExtractor
where
    AppState: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionCtx>()
            .cloned()
            .map(SessionCtxExtractor)
            .ok_or(AppError::Unauthorized)
    }
}

/// Extractor for identity-aware routes that also serve anonymous callers.
pub struct MaybeSessionCtx(pub Option<SessionCtx>);

impl FromRequestParts<AppState> for MaybeSessionCtx
where
    AppState: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeSessionCtx(parts.extensions.get::<SessionCtx>().cloned()))
    }
}
