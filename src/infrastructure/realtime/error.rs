use std::io;
use thiserror::Error;

pub type RealtimeResult<T> = Result<T, RealtimeError>;

#[derive(Debug, Error)]
pub enum RealtimeError {
    #[error("connection failed: {message}")]
    ConnectionFailed { message: String },

    #[error("connection closed with code {code}: {reason}")]
    ConnectionClosed { code: u16, reason: String },

    #[error("websocket error: {message}")]
    WebSocket { message: String },

    #[error("connection rejected by server: {message}")]
    ConnectRejected { message: String },

    #[error("server disconnected the socket")]
    ServerDisconnect,

    #[error("ping timeout: no ping within {window_ms}ms")]
    PingTimeout { window_ms: u64 },

    #[error("reconnection limit exceeded after {attempts} attempts")]
    ReconnectionLimitExceeded { attempts: u32 },

    #[error("serialization error: {message}")]
    SerializationError { message: String },

    #[error("protocol error: {message}")]
    ProtocolError { message: String },

    #[error("timeout waiting for {operation}")]
    Timeout { operation: String },

    #[error("not connected to event channel")]
    NotConnected,

    #[error("already connecting or connected")]
    AlreadyConnected,

    #[error("invalid channel url: {message}")]
    InvalidUrl { message: String },

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl RealtimeError {
    #[must_use]
    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::ConnectionFailed {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn websocket(message: impl Into<String>) -> Self {
        Self::WebSocket {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::ConnectRejected {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::ProtocolError {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::Timeout {
            operation: operation.into(),
        }
    }

    #[must_use]
    pub fn invalid_url(message: impl Into<String>) -> Self {
        Self::InvalidUrl {
            message: message.into(),
        }
    }

    /// Returns whether a new connection attempt may succeed.
    ///
    /// A connect rejection or a server-side disconnect is deliberate, so the
    /// client stays down until restarted.
    #[must_use]
    pub const fn should_reconnect(&self) -> bool {
        match self {
            Self::ConnectionFailed { .. }
            | Self::ConnectionClosed { .. }
            | Self::WebSocket { .. }
            | Self::PingTimeout { .. }
            | Self::Timeout { .. }
            | Self::ProtocolError { .. }
            | Self::Io(_) => true,

            Self::ConnectRejected { .. }
            | Self::ServerDisconnect
            | Self::ReconnectionLimitExceeded { .. }
            | Self::SerializationError { .. }
            | Self::NotConnected
            | Self::AlreadyConnected
            | Self::InvalidUrl { .. } => false,
        }
    }
}
