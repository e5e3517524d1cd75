//! Port for the realtime attendance channel
//!
//! The transport hides the concrete socket implementation. The session
//! owns reconnection policy and readiness; the transport only knows how
//! to open an authenticated connection and push events through it.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use pasalista_domain::Result;

/// Bearer credential presented when opening the realtime channel
///
/// Obtained out of band before the session is constructed; the session
/// holds it for the lifetime of the connection and re-presents it on every
/// reconnect. The token never appears in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCredential {
    token: String,
}

impl SessionCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }

    /// The raw bearer token, for the transport to present upstream
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCredential").field("token", &"<redacted>").finish()
    }
}

/// Factory for realtime connections
#[async_trait]
pub trait RealtimeTransport: Send + Sync {
    /// Open a fresh connection to the realtime channel
    ///
    /// Each call must return an independent handle. The session drops
    /// superseded handles when it reconnects.
    async fn connect(&self, credential: &SessionCredential) -> Result<Arc<dyn TransportHandle>>;
}

/// A live connection able to push named events
#[async_trait]
pub trait TransportHandle: Send + Sync {
    /// Emit one named event with a JSON payload
    async fn emit(&self, event: &str, payload: serde_json::Value) -> Result<()>;

    /// Close the connection
    async fn close(&self) -> Result<()>;
}
