/*
 * Responsibility
 * - Login-time check of email/password against a flat user directory
 * - The gate never calls this; only the login handler does
 * - Passwords are held as SHA-256 digests, never as plaintext
 */
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::HashMap;

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Returns the verified identity on success.
    async fn authenticate(&self, email: &str, password: &str) -> Option<String>;
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DirectoryParseError {
    #[error("entry {index}: expected `email:sha256hex`")]
    Entry { index: usize },
    #[error("entry {index}: password digest must be 64 hex characters")]
    Digest { index: usize },
}

/// Directory loaded once from configuration.
#[derive(Clone, Default)]
pub struct StaticDirectory {
    users: HashMap<String, [u8; 32]>,
}

impl std::fmt::Debug for StaticDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print password digests
        f.debug_struct("StaticDirectory")
            .field("users", &self.users.len())
            .finish()
    }
}

impl StaticDirectory {
    /// Parse `email:sha256hex` entries separated by commas. Blank entries are skipped.
    pub fn parse(entries: &str) -> Result<Self, DirectoryParseError> {
        let mut users = HashMap::new();

        for (index, entry) in entries
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .enumerate()
        {
            let (email, digest) = entry
                .rsplit_once(':')
                .ok_or(DirectoryParseError::Entry { index })?;
            let email = email.trim();
            if email.is_empty() {
                return Err(DirectoryParseError::Entry { index });
            }

            let mut hash = [0u8; 32];
            hex::decode_to_slice(digest.trim(), &mut hash)
                .map_err(|_| DirectoryParseError::Digest { index })?;

            users.insert(email.to_string(), hash);
        }

        Ok(Self { users })
    }

    #[cfg(test)]
    pub fn with_user(mut self, email: impl Into<String>, password: &str) -> Self {
        self.users.insert(email.into(), digest(password));
        self
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserDirectory for StaticDirectory {
    async fn authenticate(&self, email: &str, password: &str) -> Option<String> {
        let email = email.trim();
        let expected = self.users.get(email)?;

        (digest(password) == *expected).then(|| email.to_string())
    }
}

fn digest(password: &str) -> [u8; 32] {
    Sha256::digest(password.as_bytes()).into()
}
