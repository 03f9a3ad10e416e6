/*
 * Responsibility
 * - Load settings from the environment (.env is honored in development)
 * - Validate values up front so a bad deployment fails at startup, not per request
 * - The session secret lives here only until it is handed to TokenCodec
 */
use std::fmt;
use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::str::FromStr;
use std::time::Duration;

use zeroize::Zeroizing;

use crate::services::directory::StaticDirectory;
use crate::services::session::DEFAULT_KDF_ITERATIONS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Credential carrier settings.
#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub name: String,
    pub max_age_seconds: u64,
    pub secure: bool,
}

pub struct SessionConfig {
    pub secret: Zeroizing<String>,
    pub kdf_iterations: NonZeroU32,
    pub nonce_marker: String,
    pub max_age: Option<Duration>,
    pub crypto_concurrency: usize,
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print the secret
        f.debug_struct("SessionConfig")
            .field("kdf_iterations", &self.kdf_iterations)
            .field("max_age", &self.max_age)
            .field("crypto_concurrency", &self.crypto_concurrency)
            .finish()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct HttpConfig {
    pub body_limit_bytes: usize,
    pub timeout: Duration,
}

#[derive(Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub session: SessionConfig,
    pub cookie: CookieConfig,
    pub http: HttpConfig,

    // Consulted by identity-aware routes, not by the gate.
    pub allow_anonymous: bool,
    pub directory: StaticDirectory,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port: u16 = parse_or(&var, "PORT", 3000)?;
        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = var("APP_ENV")
            .map(|v| AppEnv::parse(&v))
            .unwrap_or(AppEnv::Development);

        let secret = var("SESSION_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("SESSION_SECRET"))?;

        // Lower counts would make offline guessing of the secret cheaper.
        let kdf_iterations = NonZeroU32::new(parse_or(
            &var,
            "SESSION_KDF_ITERATIONS",
            DEFAULT_KDF_ITERATIONS,
        )?)
        .filter(|n| n.get() >= DEFAULT_KDF_ITERATIONS)
        .ok_or(ConfigError::Invalid("SESSION_KDF_ITERATIONS"))?;

        let nonce_marker = var("SESSION_NONCE_MARKER").unwrap_or_else(|| "dfac5be1ee95".to_string());
        if nonce_marker.is_empty() {
            return Err(ConfigError::Invalid("SESSION_NONCE_MARKER"));
        }

        let max_age = match var("SESSION_MAX_AGE_SECONDS") {
            Some(v) => Some(Duration::from_secs(
                v.trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::Invalid("SESSION_MAX_AGE_SECONDS"))?,
            )),
            None => None,
        };

        let default_concurrency = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        let crypto_concurrency: usize =
            parse_or(&var, "SESSION_CRYPTO_CONCURRENCY", default_concurrency)?;
        if crypto_concurrency == 0 {
            return Err(ConfigError::Invalid("SESSION_CRYPTO_CONCURRENCY"));
        }

        let cookie = CookieConfig {
            name: var("SESSION_COOKIE_NAME").unwrap_or_else(|| "jnjSession".to_string()),
            max_age_seconds: parse_or(&var, "SESSION_COOKIE_MAX_AGE_SECONDS", 2_592_000)?, // 30 days
            secure: parse_or(&var, "SESSION_COOKIE_SECURE", app_env.is_production())?,
        };
        if cookie.name.is_empty() {
            return Err(ConfigError::Invalid("SESSION_COOKIE_NAME"));
        }

        let http = HttpConfig {
            body_limit_bytes: parse_or(&var, "HTTP_BODY_LIMIT_BYTES", 1024 * 1024)?,
            timeout: Duration::from_secs(parse_or(&var, "HTTP_TIMEOUT_SECONDS", 30)?),
        };

        let allow_anonymous = parse_or(&var, "ALLOW_ANONYMOUS", false)?;

        let directory = StaticDirectory::parse(&var("AUTH_USERS").unwrap_or_default())
            .map_err(|_| ConfigError::Invalid("AUTH_USERS"))?;

        Ok(Self {
            addr,
            app_env,
            session: SessionConfig {
                secret: Zeroizing::new(secret),
                kdf_iterations,
                nonce_marker,
                max_age,
                crypto_concurrency,
            },
            cookie,
            http,
            allow_anonymous,
            directory,
        })
    }
}

// Unset -> default; set but unparsable -> startup error.
fn parse_or<T: FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match var(key) {
        Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}
