use url::form_urlencoded;
use crate::core::{GpError, Result};

const EMAIL_KEY: &str = "Email";

/// Key/value fields of a backend auth string (`Email=...&Token=...`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthParams {
    pairs: Vec<(String, String)>,
}

impl AuthParams {
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(GpError::InvalidAuthString("auth string is empty".to_string()));
        }
        if !raw.contains('=') {
            return Err(GpError::InvalidAuthString("expected key=value pairs".to_string()));
        }

        let pairs = form_urlencoded::parse(raw.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Ok(Self { pairs })
    }

    /// First value stored under `key`, matched exactly
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn email(&self) -> Option<&str> {
        self.get(EMAIL_KEY).filter(|email| !email.is_empty())
    }
}

/// Email an auth string belongs to
pub fn email_from_auth(raw: &str) -> Result<String> {
    AuthParams::parse(raw)?
        .email()
        .map(str::to_string)
        .ok_or_else(|| GpError::InvalidAuthString("missing Email field".to_string()))
}
