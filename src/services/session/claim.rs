use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::codec::TokenError;

/// Plaintext payload sealed inside a session token.
///
/// Field order is part of the sealed bytes: serde emits `email`, `token`, `time`
/// in declaration order, and both directions go through the same serializer.
/// The wire keys match cookies issued by the previous ticket desk deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    #[serde(rename = "email")]
    identity: String,
    #[serde(rename = "token")]
    nonce_marker: String,
    // milliseconds since epoch
    #[serde(rename = "time")]
    issued_at: i64,
}

impl Claim {
    /// Build a claim stamped with the current time.
    pub fn issue(
        identity: impl Into<String>,
        nonce_marker: impl Into<String>,
    ) -> Result<Self, TokenError> {
        Self::with_issued_at(identity, nonce_marker, Utc::now().timestamp_millis())
    }

    pub fn with_issued_at(
        identity: impl Into<String>,
        nonce_marker: impl Into<String>,
        issued_at: i64,
    ) -> Result<Self, TokenError> {
        let identity = identity.into();
        let nonce_marker = nonce_marker.into();

        if identity.trim().is_empty() || nonce_marker.is_empty() {
            return Err(TokenError::MalformedClaim);
        }

        Ok(Self {
            identity,
            nonce_marker,
            issued_at,
        })
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn nonce_marker(&self) -> &str {
        &self.nonce_marker
    }

    pub fn issued_at(&self) -> i64 {
        self.issued_at
    }

    /// True when the claim is older than `max_age` at `now_ms`.
    ///
    /// A claim stamped in the future is not expired here; clock skew between
    /// instances is tolerated rather than treated as tampering.
    pub fn is_older_than(&self, max_age: Duration, now_ms: i64) -> bool {
        let max_age_ms = i64::try_from(max_age.as_millis()).unwrap_or(i64::MAX);
        now_ms.saturating_sub(self.issued_at) > max_age_ms
    }

    /// Decoded claims may carry an empty identity; the codec does not reject
    /// them, the gate does.
    pub fn has_identity(&self) -> bool {
        !self.identity.trim().is_empty()
    }
}
