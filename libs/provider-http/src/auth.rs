//! Bearer-token capability.

use crate::error::HttpError;
use async_trait::async_trait;
use http::HeaderValue;
use secrecy::{ExposeSecret, SecretString};
use zeroize::Zeroizing;

/// Supplies the access token attached to every backend call.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// # Errors
    /// Returns [`HttpError::Credentials`] when no token can be obtained.
    async fn token(&self) -> Result<SecretString, HttpError>;
}

/// A token fixed at configuration time.
pub struct StaticToken(SecretString);

impl StaticToken {
    #[must_use]
    pub fn new(token: SecretString) -> Self {
        Self(token)
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StaticToken([REDACTED])")
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn token(&self) -> Result<SecretString, HttpError> {
        if self.0.expose_secret().is_empty() {
            return Err(HttpError::Credentials("access token is empty".into()));
        }
        Ok(self.0.clone())
    }
}

/// `Bearer <token>` header value flagged sensitive so it never shows in debug output.
///
/// # Errors
/// Returns [`HttpError::InvalidHeaderValue`] when the token has characters not allowed in headers.
pub fn bearer_header(token: &SecretString) -> Result<HeaderValue, HttpError> {
    let raw = Zeroizing::new(format!("Bearer {}", token.expose_secret()));
    let mut value = HeaderValue::from_str(&raw)?;
    value.set_sensitive(true);
    Ok(value)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn bearer_header_is_sensitive() {
        let value = bearer_header(&SecretString::from("abc".to_owned())).unwrap();
        assert!(value.is_sensitive());
        assert_eq!(value.to_str().unwrap(), "Bearer abc");
    }

    #[tokio::test]
    async fn empty_static_token_is_refused() {
        let provider = StaticToken::new(SecretString::from(String::new()));
        assert!(matches!(provider.token().await, Err(HttpError::Credentials(_))));
    }

    #[test]
    fn static_token_is_handed_out_unchanged() {
        let provider = StaticToken::new(SecretString::from("abc".to_owned()));
        let token = tokio_test::block_on(provider.token()).unwrap();
        assert_eq!(token.expose_secret(), "abc");
    }

    #[test]
    fn debug_hides_the_token() {
        let provider = StaticToken::new(SecretString::from("hunter2".to_owned()));
        assert!(!format!("{provider:?}").contains("hunter2"));
    }
}
