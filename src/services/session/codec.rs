//! Sealing and opening of session claims.
//!
//! Envelope layout (then standard base64, then percent-encoding for the cookie):
//!
//! ```text
//! [salt: 64][iv: 12][tag: 16][ciphertext: n]
//! ```
//!
//! The key is PBKDF2-HMAC-SHA512(secret, salt) and the cipher is AES-256-GCM
//! with a detached tag and no associated data. The iteration count is not part
//! of the envelope, so every instance of a deployment must agree on it.

use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sha2::Sha512;
use std::fmt;
use std::num::NonZeroU32;
use tracing::{debug, error};
use zeroize::Zeroizing;

use super::claim::Claim;

pub const SALT_LEN: usize = 64;
pub const IV_LEN: usize = 12;
pub const TAG_LEN: usize = 16;
pub const KEY_LEN: usize = 32;

/// salt + iv + tag; an empty ciphertext is still a well-formed envelope.
pub const ENVELOPE_HEADER_LEN: usize = SALT_LEN + IV_LEN + TAG_LEN;

pub const DEFAULT_KDF_ITERATIONS: u32 = 2145;

const IV_START: usize = SALT_LEN;
const TAG_START: usize = SALT_LEN + IV_LEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("malformed token envelope")]
    MalformedEnvelope,
    #[error("token authentication failed")]
    AuthenticationFailed,
    #[error("malformed token claim")]
    MalformedClaim,
    #[error("internal crypto failure")]
    InternalCryptoFailure,
}

impl TokenError {
    /// Short label for structured logs.
    pub fn category(&self) -> &'static str {
        match self {
            Self::MalformedEnvelope => "malformed_envelope",
            Self::AuthenticationFailed => "authentication_failed",
            Self::MalformedClaim => "malformed_claim",
            Self::InternalCryptoFailure => "internal_crypto_failure",
        }
    }
}

/// AES-256-GCM sealer keyed per token from a process secret.
///
/// - The secret is injected by the caller; there is no global key material.
/// - Key material is intentionally not printable via Debug.
pub struct TokenCodec {
    secret: Zeroizing<Vec<u8>>,
    iterations: NonZeroU32,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("TokenCodec")
            .field("iterations", &self.iterations)
            .finish()
    }
}

impl TokenCodec {
    pub fn new(secret: impl AsRef<[u8]>, iterations: NonZeroU32) -> Self {
        Self {
            secret: Zeroizing::new(secret.as_ref().to_vec()),
            iterations,
        }
    }

    pub fn iterations(&self) -> u32 {
        self.iterations.get()
    }

    /// Encrypt a claim into the raw envelope bytes.
    pub fn encrypt(&self, claim: &Claim) -> Result<Vec<u8>, TokenError> {
        let plaintext = Zeroizing::new(serde_json::to_vec(claim).map_err(|e| {
            error!(error = %e, "failed to serialize session claim");
            TokenError::InternalCryptoFailure
        })?);

        self.seal_bytes(&plaintext)
    }

    /// Decrypt raw envelope bytes back into a claim.
    pub fn decrypt(&self, envelope: &[u8]) -> Result<Claim, TokenError> {
        let plaintext = self.open_bytes(envelope)?;

        serde_json::from_slice::<Claim>(&plaintext).map_err(|e| {
            debug!(error = %e, "sealed payload is not a session claim");
            TokenError::MalformedClaim
        })
    }

    /// Encrypt and encode for cookie transport.
    pub fn seal(&self, claim: &Claim) -> Result<String, TokenError> {
        let envelope = self.encrypt(claim)?;
        let encoded = STANDARD.encode(envelope);

        Ok(urlencoding::encode(&encoded).into_owned())
    }

    /// Decode a cookie value and decrypt it.
    pub fn open(&self, token: &str) -> Result<Claim, TokenError> {
        let decoded = urlencoding::decode(token).map_err(|_| TokenError::MalformedEnvelope)?;
        let envelope = STANDARD
            .decode(decoded.trim().as_bytes())
            .map_err(|_| TokenError::MalformedEnvelope)?;

        self.decrypt(&envelope)
    }

    fn seal_bytes(&self, plaintext: &[u8]) -> Result<Vec<u8>, TokenError> {
        let mut salt = [0u8; SALT_LEN];
        let mut iv = [0u8; IV_LEN];
        fill_random(&mut salt)?;
        fill_random(&mut iv)?;

        let cipher = self.cipher_for(&salt)?;
        let mut buffer = plaintext.to_vec();
        let tag = cipher
            .encrypt_in_place_detached(Nonce::from_slice(&iv), b"", &mut buffer)
            .map_err(|_| {
                error!("aes-gcm encryption failed");
                TokenError::InternalCryptoFailure
            })?;

        let mut envelope = Vec::with_capacity(ENVELOPE_HEADER_LEN + buffer.len());
        envelope.extend_from_slice(&salt);
        envelope.extend_from_slice(&iv);
        envelope.extend_from_slice(&tag);
        envelope.extend_from_slice(&buffer);
        Ok(envelope)
    }

    fn open_bytes(&self, envelope: &[u8]) -> Result<Zeroizing<Vec<u8>>, TokenError> {
        // Checked before any key derivation.
        if envelope.len() < ENVELOPE_HEADER_LEN {
            return Err(TokenError::MalformedEnvelope);
        }

        let salt = &envelope[..IV_START];
        let iv = &envelope[IV_START..TAG_START];
        let tag = &envelope[TAG_START..ENVELOPE_HEADER_LEN];
        let ciphertext = &envelope[ENVELOPE_HEADER_LEN..];

        let cipher = self.cipher_for(salt)?;
        let mut buffer = Zeroizing::new(ciphertext.to_vec());
        cipher
            .decrypt_in_place_detached(
                Nonce::from_slice(iv),
                b"",
                buffer.as_mut_slice(),
                GenericArray::from_slice(tag),
            )
            .map_err(|_| TokenError::AuthenticationFailed)?;

        Ok(buffer)
    }

    fn cipher_for(&self, salt: &[u8]) -> Result<Aes256Gcm, TokenError> {
        let key = self.derive_key(salt);

        Aes256Gcm::new_from_slice(key.as_slice()).map_err(|_| {
            error!("failed to initialize aes-256-gcm");
            TokenError::InternalCryptoFailure
        })
    }

    fn derive_key(&self, salt: &[u8]) -> Zeroizing<[u8; KEY_LEN]> {
        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        pbkdf2::pbkdf2_hmac::<Sha512>(&self.secret, salt, self.iterations.get(), key.as_mut_slice());
        key
    }
}

fn fill_random(buf: &mut [u8]) -> Result<(), TokenError> {
    getrandom::fill(buf).map_err(|e| {
        error!(error = %e, "os random source unavailable");
        TokenError::InternalCryptoFailure
    })
}
