/*
 * Responsibility
 * - Shared context bound to the Router (AppState)
 *   - sessions: token issue/resolve, directory: login check, cookie: carrier settings
 * - Cheap to Clone (Arc inside)
 */
use std::sync::Arc;

use crate::middleware::auth::carrier::SessionCookie;
use crate::services::{directory::UserDirectory, session::SessionService};

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionService>,
    pub directory: Arc<dyn UserDirectory>,
    pub cookie: SessionCookie,
    pub allow_anonymous: bool,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("sessions", &self.sessions)
            .field("cookie", &self.cookie)
            .field("allow_anonymous", &self.allow_anonymous)
            .finish()
    }
}

impl AppState {
    pub fn new(
        sessions: Arc<SessionService>,
        directory: Arc<dyn UserDirectory>,
        cookie: SessionCookie,
        allow_anonymous: bool,
    ) -> Self {
        Self {
            sessions,
            directory,
            cookie,
            allow_anonymous,
        }
    }
}
