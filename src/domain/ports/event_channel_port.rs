//! Event channel port definition.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::ConnectionStatus;
use crate::domain::errors::ActionError;

/// Events surfaced by an event channel implementation.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    /// Joined the namespace.
    Connected {
        /// Socket id assigned by the server.
        session_id: String,
    },
    /// Connection lost or closed.
    Disconnected {
        /// Human-readable reason.
        reason: String,
    },
    /// About to retry connecting.
    Reconnecting {
        /// Attempt number, starting at 1.
        attempt: u32,
    },
    /// Named event pushed by the server.
    Message {
        /// Event name.
        event: String,
        /// First event argument, `null` when absent.
        payload: Value,
    },
    /// Transport error.
    Error {
        /// Error description.
        message: String,
        /// Whether the channel keeps retrying.
        recoverable: bool,
    },
}

/// Port for the persistent bidirectional event channel.
#[async_trait]
pub trait EventChannelPort: Send + Sync {
    /// Emits a named event. Returns once the event is handed to the transport,
    /// not when the server acknowledges it.
    async fn emit(&self, event: &str, payload: Value) -> Result<(), ActionError>;

    /// Returns the current connection status.
    fn status(&self) -> ConnectionStatus;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use parking_lot::Mutex;

    /// Channel that records emitted events.
    #[derive(Default)]
    pub struct RecordingChannel {
        emitted: Mutex<Vec<(String, Value)>>,
        failure: Mutex<Option<ActionError>>,
    }

    impl RecordingChannel {
        /// Creates new recording channel.
        pub fn new() -> Self {
            Self::default()
        }

        /// Makes every following emit fail with the given error.
        pub fn fail_with(&self, error: ActionError) {
            *self.failure.lock() = Some(error);
        }

        /// Returns all emitted events in order.
        pub fn emitted(&self) -> Vec<(String, Value)> {
            self.emitted.lock().clone()
        }

        /// Returns the last emitted event.
        pub fn last(&self) -> Option<(String, Value)> {
            self.emitted.lock().last().cloned()
        }
    }

    #[async_trait]
    impl EventChannelPort for RecordingChannel {
        async fn emit(&self, event: &str, payload: Value) -> Result<(), ActionError> {
            if let Some(error) = self.failure.lock().clone() {
                return Err(error);
            }
            self.emitted.lock().push((event.to_string(), payload));
            Ok(())
        }

        fn status(&self) -> ConnectionStatus {
            ConnectionStatus::Connected
        }
    }
}
