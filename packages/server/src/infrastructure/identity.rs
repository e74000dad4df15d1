//! Cookie-based identity extraction.

use axum::http::{HeaderMap, header::COOKIE};

use crate::domain::{ClientName, IdentityError, IdentityExtractor};

/// Default name of the cookie carrying the client's display name
pub const DEFAULT_COOKIE_NAME: &str = "auth";

/// Reads the client name from a request cookie.
#[derive(Debug, Clone)]
pub struct CookieIdentityExtractor {
    cookie_name: String,
}

impl CookieIdentityExtractor {
    pub fn new(cookie_name: impl Into<String>) -> Self {
        Self {
            cookie_name: cookie_name.into(),
        }
    }

    fn find_cookie<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(key, _)| *key == self.cookie_name)
            .map(|(_, value)| {
                let value = value.trim();
                value
                    .strip_prefix('"')
                    .and_then(|v| v.strip_suffix('"'))
                    .unwrap_or(value)
            })
    }
}

impl Default for CookieIdentityExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_COOKIE_NAME)
    }
}

impl IdentityExtractor for CookieIdentityExtractor {
    fn extract(&self, headers: &HeaderMap) -> Result<ClientName, IdentityError> {
        let value = self
            .find_cookie(headers)
            .ok_or_else(|| IdentityError::MissingCookie(self.cookie_name.clone()))?;
        Ok(ClientName::try_from(value.to_string())?)
    }
}
