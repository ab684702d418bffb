//! Event channel connection status.

/// Connection status of the event channel as seen by the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    /// Not connected and not trying.
    #[default]
    Disconnected,
    /// First connection attempt in progress.
    Connecting,
    /// Connected and joined to the namespace.
    Connected,
    /// Waiting to retry after losing the connection.
    Reconnecting,
    /// Gave up after an unrecoverable error.
    Error,
}

impl ConnectionStatus {
    /// Returns whether emits are delivered right away.
    #[must_use]
    pub const fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
            Self::Reconnecting => write!(f, "reconnecting"),
            Self::Error => write!(f, "error"),
        }
    }
}
