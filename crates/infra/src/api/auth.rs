//! API authentication
//!
//! Token acquisition is behind a trait so the client can be tested with mock
//! providers and so installations can plug in their own credential source.

use async_trait::async_trait;

use super::errors::ApiError;

/// Trait for providing access tokens
///
/// This trait allows dependency injection and testing with mock providers.
/// The token is requested per attempt, so providers that refresh credentials
/// get a chance to hand out a fresh one between retries.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Get a valid access token
    async fn access_token(&self) -> Result<String, ApiError>;
}

/// Token provider backed by a fixed installation token
///
/// The attendance backend issues one long-lived token per enrolled device;
/// there is no interactive login flow in the engine.
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

#[async_trait]
impl AccessTokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<String, ApiError> {
        if self.token.is_empty() {
            return Err(ApiError::Auth("installation token is empty".to_string()));
        }
        Ok(self.token.clone())
    }
}
