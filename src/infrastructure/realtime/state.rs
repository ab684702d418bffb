use crate::domain::ConnectionStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelState {
    #[default]
    Disconnected,
    Connecting,
    WaitingForOpen,
    JoiningNamespace,
    Connected,
    Reconnecting {
        attempt: u32,
    },
    ShuttingDown,
}

impl ChannelState {
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(
            self,
            Self::Connecting | Self::WaitingForOpen | Self::JoiningNamespace | Self::Connected
        )
    }

    #[must_use]
    pub const fn reconnect_attempt(&self) -> Option<u32> {
        if let Self::Reconnecting { attempt } = self {
            Some(*attempt)
        } else {
            None
        }
    }
}

impl From<ChannelState> for ConnectionStatus {
    fn from(state: ChannelState) -> Self {
        match state {
            ChannelState::Disconnected | ChannelState::ShuttingDown => Self::Disconnected,
            ChannelState::Connecting
            | ChannelState::WaitingForOpen
            | ChannelState::JoiningNamespace => Self::Connecting,
            ChannelState::Connected => Self::Connected,
            ChannelState::Reconnecting { .. } => Self::Reconnecting,
        }
    }
}

impl std::fmt::Display for ChannelState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disconnected => write!(f, "Disconnected"),
            Self::Connecting => write!(f, "Connecting"),
            Self::WaitingForOpen => write!(f, "Waiting for Open"),
            Self::JoiningNamespace => write!(f, "Joining namespace"),
            Self::Connected => write!(f, "Connected"),
            Self::Reconnecting { attempt } => write!(f, "Reconnecting (attempt {attempt})"),
            Self::ShuttingDown => write!(f, "Shutting Down"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_state_display() {
        assert_eq!(ChannelState::Connected.to_string(), "Connected");
        assert_eq!(
            ChannelState::Reconnecting { attempt: 3 }.to_string(),
            "Reconnecting (attempt 3)"
        );
    }

    #[test]
    fn test_channel_state_checks() {
        assert!(ChannelState::Connected.is_connected());
        assert!(ChannelState::JoiningNamespace.is_active());
        assert!(!ChannelState::Reconnecting { attempt: 1 }.is_active());
        assert_eq!(
            ChannelState::Reconnecting { attempt: 2 }.reconnect_attempt(),
            Some(2)
        );
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ConnectionStatus::from(ChannelState::WaitingForOpen),
            ConnectionStatus::Connecting
        );
        assert_eq!(
            ConnectionStatus::from(ChannelState::Reconnecting { attempt: 1 }),
            ConnectionStatus::Reconnecting
        );
        assert_eq!(
            ConnectionStatus::from(ChannelState::ShuttingDown),
            ConnectionStatus::Disconnected
        );
    }
}
