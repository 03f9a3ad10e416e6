/*
 * Responsibility
 * - Login form and session-related response DTOs
 * - validate() only checks shape; credentials are checked by the directory
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct LoginRequest {
    // Missing fields fail as a bad login (redirect), not as a 422
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.email.trim().is_empty() {
            return Err("email is required");
        }
        if self.password.is_empty() {
            return Err("password is required");
        }
        if self.email.len() > 254 {
            return Err("email must be <= 254 chars");
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct LoginFormResponse {
    pub action: &'static str,
    pub method: &'static str,
    pub fields: [&'static str; 2],
}

#[derive(Debug, Serialize)]
pub struct IdentityResponse {
    pub authenticated: bool,
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub email: String,
    pub issued_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn validate_requires_both_fields() {
        assert!(request("ops@desk.io", "hunter2").validate().is_ok());
        assert_eq!(request(" ", "hunter2").validate(), Err("email is required"));
        assert_eq!(request("ops@desk.io", "").validate(), Err("password is required"));
    }

    #[test]
    fn debug_never_prints_password() {
        let rendered = format!("{:?}", request("ops@desk.io", "hunter2"));

        assert!(rendered.contains("ops@desk.io"));
        assert!(!rendered.contains("hunter2"));
    }
}
