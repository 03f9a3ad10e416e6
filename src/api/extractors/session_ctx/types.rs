/*
 * Responsibility
 * - The "authenticated context" type handlers see
 * - The gate middleware verifies the cookie and stores this in request extensions;
 *   handlers only ever receive this type
 */
use chrono::{DateTime, Utc};

use crate::services::session::Claim;

/// Context attached to requests whose session cookie opened successfully.
///
/// - `email` is the identity sealed at login
/// - `issued_at` is the claim's issuance time (ms since epoch), useful for
///   route-specific freshness rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCtx {
    pub email: String,
    pub issued_at: i64,
}

impl SessionCtx {
    pub fn from_claim(claim: &Claim) -> Self {
        Self {
            email: claim.identity().to_owned(),
            issued_at: claim.issued_at(),
        }
    }

    pub fn issued_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp_millis(self.issued_at)
    }
}
