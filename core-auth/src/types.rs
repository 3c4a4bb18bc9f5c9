use core_runtime::logging::redact_if_sensitive;
use std::fmt;

use crate::error::{AuthError, Result};

/// Integration record credentials (consumer key and secret).
///
/// # Examples
///
/// ```
/// use core_auth::ConsumerCredentials;
///
/// let consumer = ConsumerCredentials::new("ck-1", "very-secret").unwrap();
/// assert!(!format!("{:?}", consumer).contains("very-secret"));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ConsumerCredentials {
    key: String,
    secret: String,
}

impl ConsumerCredentials {
    /// Create consumer credentials, rejecting empty values.
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Result<Self> {
        let (key, secret) = non_empty_pair("consumer", key.into(), secret.into())?;
        Ok(Self { key, secret })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for ConsumerCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsumerCredentials")
            .field("key", &redact_if_sensitive("consumer_key", &self.key))
            .field("secret", &redact_if_sensitive("consumer_secret", &self.secret))
            .finish()
    }
}

/// Access token issued to a user/role pair (token id and secret).
#[derive(Clone, PartialEq, Eq)]
pub struct TokenCredentials {
    key: String,
    secret: String,
}

impl TokenCredentials {
    /// Create token credentials, rejecting empty values.
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Result<Self> {
        let (key, secret) = non_empty_pair("token", key.into(), secret.into())?;
        Ok(Self { key, secret })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for TokenCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCredentials")
            .field("key", &redact_if_sensitive("token_key", &self.key))
            .field("secret", &redact_if_sensitive("token_secret", &self.secret))
            .finish()
    }
}

fn non_empty_pair(kind: &str, key: String, secret: String) -> Result<(String, String)> {
    if key.is_empty() {
        return Err(AuthError::InvalidCredentials(format!(
            "{} key is empty",
            kind
        )));
    }
    if secret.is_empty() {
        return Err(AuthError::InvalidCredentials(format!(
            "{} secret is empty",
            kind
        )));
    }
    Ok((key, secret))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_values_rejected() {
        assert!(ConsumerCredentials::new("", "cs").is_err());
        assert!(TokenCredentials::new("tk", "").is_err());
    }

    #[test]
    fn test_debug_redacts_both_halves() {
        let token = TokenCredentials::new("token-id-123", "token-secret-456").unwrap();
        let rendered = format!("{:?}", token);

        assert!(!rendered.contains("token-id-123"));
        assert!(!rendered.contains("token-secret-456"));
        assert_eq!(token.key(), "token-id-123");
    }
}
