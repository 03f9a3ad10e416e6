//! Session cookie (the credential carrier).
//!
//! The cookie value is the percent-encoded token produced by `TokenCodec::seal`.
//! Name, lifetime and `Secure` come from configuration.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::config::CookieConfig;

#[derive(Debug, Clone)]
pub struct SessionCookie {
    name: String,
    max_age: time::Duration,
    secure: bool,
}

impl SessionCookie {
    pub fn new(name: impl Into<String>, max_age_seconds: u64, secure: bool) -> Self {
        Self {
            name: name.into(),
            max_age: time::Duration::seconds(i64::try_from(max_age_seconds).unwrap_or(i64::MAX)),
            secure,
        }
    }

    pub fn from_config(config: &CookieConfig) -> Self {
        Self::new(config.name.clone(), config.max_age_seconds, config.secure)
    }

    /// Raw (untrusted) credential, if the request carries a non-empty one.
    pub fn read(&self, jar: &CookieJar) -> Option<String> {
        jar.get(&self.name)
            .map(|c| c.value().to_owned())
            .filter(|v| !v.is_empty())
    }

    pub fn store(&self, jar: CookieJar, token: String) -> CookieJar {
        let cookie = Cookie::build((self.name.clone(), token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(self.max_age);

        jar.add(cookie)
    }

    /// Always emits an expired cookie, even when the request carried none.
    /// (`CookieJar::remove` only does so for cookies that arrived with the request.)
    pub fn clear(&self, jar: CookieJar) -> CookieJar {
        let mut cookie = Cookie::build((self.name.clone(), "")).path("/").build();
        cookie.make_removal();

        jar.add(cookie)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, HeaderValue, header};
    use axum::response::IntoResponse;

    fn set_cookie_headers(jar: CookieJar) -> Vec<String> {
        jar.into_response()
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn reads_only_the_configured_cookie() {
        let carrier = SessionCookie::new("jnjSession", 60, false);
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; jnjSession=abc123; lang=en"),
        );

        let jar = CookieJar::from_headers(&headers);
        assert_eq!(carrier.read(&jar), Some("abc123".to_string()));

        let other = SessionCookie::new("otherSession", 60, false);
        assert_eq!(other.read(&jar), None);
    }

    #[test]
    fn empty_cookie_value_is_absent() {
        let carrier = SessionCookie::new("jnjSession", 60, false);
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("jnjSession="));

        assert_eq!(carrier.read(&CookieJar::from_headers(&headers)), None);
    }

    #[test]
    fn stored_cookie_is_http_only_and_scoped_to_root() {
        let carrier = SessionCookie::new("jnjSession", 3600, true);
        let headers = set_cookie_headers(carrier.store(CookieJar::new(), "tok".to_string()));

        assert_eq!(headers.len(), 1);
        let cookie = &headers[0];
        assert!(cookie.starts_with("jnjSession=tok"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("Max-Age=3600"));
    }

    #[test]
    fn clear_expires_the_cookie() {
        let carrier = SessionCookie::new("jnjSession", 3600, false);
        let headers = set_cookie_headers(carrier.clear(CookieJar::new()));

        assert_eq!(headers.len(), 1);
        assert!(headers[0].starts_with("jnjSession="));
        assert!(headers[0].contains("Max-Age=0"));
    }
}
