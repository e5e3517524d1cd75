//! Realtime session lifecycle over a pluggable transport

pub mod ports;
pub mod session;

pub use ports::{RealtimeTransport, SessionCredential, TransportHandle};
pub use session::{RealtimeSession, SessionPhase};
