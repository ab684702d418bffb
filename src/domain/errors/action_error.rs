//! Event channel action error types.

use thiserror::Error;

use crate::domain::entities::ActionKind;

/// Errors resolving an action sent over the event channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum ActionError {
    #[error("{kind} rejected by backend: {message}")]
    Rejected { kind: ActionKind, message: String },

    #[error("{kind} got no feedback within {timeout_ms}ms")]
    TimedOut { kind: ActionKind, timeout_ms: u64 },

    #[error("event channel unavailable: {message}")]
    ChannelUnavailable { message: String },

    #[error("event channel closed")]
    ChannelClosed,

    #[error("failed to serialize {kind} payload: {message}")]
    Serialization { kind: ActionKind, message: String },

    #[error("{kind} abandoned before feedback arrived")]
    Abandoned { kind: ActionKind },
}

impl ActionError {
    /// Creates rejection error.
    #[must_use]
    pub fn rejected(kind: ActionKind, message: impl Into<String>) -> Self {
        Self::Rejected {
            kind,
            message: message.into(),
        }
    }

    /// Creates channel unavailable error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::ChannelUnavailable {
            message: message.into(),
        }
    }

    /// Returns whether the backend answered with an error field.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    /// Returns whether the action may have been applied anyway.
    #[must_use]
    pub const fn outcome_unknown(&self) -> bool {
        matches!(self, Self::TimedOut { .. } | Self::Abandoned { .. })
    }
}
