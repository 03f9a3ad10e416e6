/*
 * Responsibility
 * - Stateless cookie sessions: the cookie is the session, verified on every request
 * - claim: the sealed payload
 * - codec: envelope layout + AES-256-GCM / PBKDF2 (the only place key material lives)
 * - service: async issue/resolve with bounded crypto concurrency
 */
pub mod claim;
pub mod codec;
pub mod service;

pub use claim::Claim;
pub use codec::{DEFAULT_KDF_ITERATIONS, TokenCodec, TokenError};
pub use service::{Classification, CredentialError, SessionPolicy, SessionService};
