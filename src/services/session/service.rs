use chrono::Utc;
use std::{sync::Arc, time::Duration};
use tokio::sync::Semaphore;
use tracing::{debug, error, warn};

use super::claim::Claim;
use super::codec::{TokenCodec, TokenError};

/// Why a request ended up anonymous. Neither variant is shown to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    #[error("no credential")]
    NoCredential,
    #[error("invalid credential")]
    InvalidCredential,
}

/// Per-request classification derived from the credential carrier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Anonymous(CredentialError),
    Authenticated(Claim),
}

impl Classification {
    pub fn identity(&self) -> Option<&str> {
        match self {
            Self::Authenticated(claim) => Some(claim.identity()),
            Self::Anonymous(_) => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

/// Knobs for [`SessionService`] that come from configuration.
#[derive(Debug, Clone)]
pub struct SessionPolicy {
    pub nonce_marker: String,
    // None: the gate does not enforce a lifetime beyond the cookie's own max-age.
    pub max_age: Option<Duration>,
    pub max_concurrent_crypto: usize,
}

/// Issues and resolves session tokens.
///
/// KDF + AEAD work is CPU-bound, so it runs on the blocking pool behind a
/// semaphore; under load requests queue for a permit instead of starving the
/// reactor.
#[derive(Debug)]
pub struct SessionService {
    codec: Arc<TokenCodec>,
    permits: Arc<Semaphore>,
    policy: SessionPolicy,
}

impl SessionService {
    pub fn new(codec: TokenCodec, policy: SessionPolicy) -> Self {
        let permits = Arc::new(Semaphore::new(policy.max_concurrent_crypto.max(1)));

        Self {
            codec: Arc::new(codec),
            permits,
            policy,
        }
    }

    /// Seal a fresh claim for an identity the login flow has already verified.
    ///
    /// Errors here are hard failures: login cannot continue without a token.
    pub async fn issue(&self, identity: &str) -> Result<String, TokenError> {
        let claim = Claim::issue(identity, self.policy.nonce_marker.as_str())?;

        let token = self.run_bounded(move |codec| codec.seal(&claim)).await?;

        debug!(identity = %identity, "issued session token");
        Ok(token)
    }

    pub async fn classify(&self, credential: Option<&str>) -> Classification {
        match self.resolve_identity(credential).await {
            Ok(claim) => Classification::Authenticated(claim),
            Err(reason) => Classification::Anonymous(reason),
        }
    }

    /// Open a cookie value and return the verified claim (identity + issuance time).
    ///
    /// Every failure is logged here and collapses to `InvalidCredential`.
    pub async fn resolve_identity(&self, credential: Option<&str>) -> Result<Claim, CredentialError> {
        let credential = match credential.map(str::trim) {
            Some(value) if !value.is_empty() => value,
            _ => return Err(CredentialError::NoCredential),
        };

        let token = credential.to_owned();
        let claim = match self.run_bounded(move |codec| codec.open(&token)).await {
            Ok(claim) => claim,
            Err(err) => {
                if err == TokenError::InternalCryptoFailure {
                    error!(credential = %credential, "session crypto failed while resolving credential");
                } else {
                    warn!(
                        credential = %credential,
                        reason = err.category(),
                        "invalid authentication session"
                    );
                }
                return Err(CredentialError::InvalidCredential);
            }
        };

        if let Err(reason) = self.check_claim(&claim) {
            warn!(credential = %credential, reason, "invalid authentication session");
            return Err(CredentialError::InvalidCredential);
        }

        Ok(claim)
    }

    fn check_claim(&self, claim: &Claim) -> Result<(), &'static str> {
        if !claim.has_identity() {
            return Err("empty_identity");
        }
        if claim.nonce_marker() != self.policy.nonce_marker {
            return Err("nonce_marker_mismatch");
        }
        match self.policy.max_age {
            Some(max_age) if claim.is_older_than(max_age, Utc::now().timestamp_millis()) => {
                Err("expired")
            }
            _ => Ok(()),
        }
    }

    async fn run_bounded<T, F>(&self, op: F) -> Result<T, TokenError>
    where
        F: FnOnce(&TokenCodec) -> Result<T, TokenError> + Send + 'static,
        T: Send + 'static,
    {
        let permit = Arc::clone(&self.permits).acquire_owned().await.map_err(|_| {
            error!("session crypto admission closed");
            TokenError::InternalCryptoFailure
        })?;

        let codec = Arc::clone(&self.codec);
        // The permit travels with the blocking task: a cancelled caller does not free it early.
        match tokio::task::spawn_blocking(move || {
            let _permit = permit;
            op(&codec)
        })
        .await
        {
            Ok(result) => result,
            Err(e) => {
                error!(error = %e, "session crypto task failed");
                Err(TokenError::InternalCryptoFailure)
            }
        }
    }
}
