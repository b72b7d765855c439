//! Access token seam for the BC client.
//!
//! Token acquisition itself (OAuth flows, caching, refresh) lives outside
//! this crate; the client only depends on this trait. Each page round asks
//! for a fresh token, so providers are free to cache internally.

use async_trait::async_trait;

use crate::bc::{BcError, BcResult};

#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Returns a bearer token valid for the next request.
    ///
    /// # Errors
    ///
    /// Returns [`BcError::Auth`] when no token can be produced; the client
    /// treats this as fatal and does not retry.
    async fn access_token(&self) -> BcResult<String>;
}

/// Provider backed by a pre-issued token, used for service accounts and in
/// tests.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl AccessTokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> BcResult<String> {
        if self.token.is_empty() {
            return Err(BcError::Auth("empty access token configured".into()));
        }
        Ok(self.token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_provider_returns_token() {
        let provider = StaticTokenProvider::new("abc123");
        assert_eq!(provider.access_token().await.unwrap(), "abc123");
    }

    #[tokio::test]
    async fn empty_token_is_an_auth_error() {
        let provider = StaticTokenProvider::new("");
        assert!(matches!(
            provider.access_token().await,
            Err(BcError::Auth(_))
        ));
    }
}
