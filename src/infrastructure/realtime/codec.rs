use std::fmt::Write as _;

use serde_json::{Value, json};

use super::constants::{DEFAULT_NAMESPACE, EnginePacketType, SocketPacketType};
use super::error::{RealtimeError, RealtimeResult};
use super::payloads::OpenPayload;

/// One Engine.IO text frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnginePacket {
    Open(OpenPayload),
    Close,
    Ping,
    Pong,
    Message(String),
    Upgrade,
    Noop,
}

impl EnginePacket {
    /// Wraps a Socket.IO packet in an Engine.IO message.
    #[must_use]
    pub fn socket(packet: &SocketPacket) -> Self {
        Self::Message(packet.encode())
    }

    /// # Errors
    ///
    /// Returns error on an empty frame, an unknown type or a malformed open
    /// handshake.
    pub fn decode(text: &str) -> RealtimeResult<Self> {
        let (kind, rest) = split_type(text)?;
        let kind = EnginePacketType::from_u8(kind)
            .ok_or_else(|| RealtimeError::protocol(format!("unknown engine packet type {kind}")))?;

        Ok(match kind {
            EnginePacketType::Open => {
                let open = serde_json::from_str(rest).map_err(|e| {
                    RealtimeError::serialization(format!("invalid open packet: {e}"))
                })?;
                Self::Open(open)
            }
            EnginePacketType::Close => Self::Close,
            EnginePacketType::Ping => Self::Ping,
            EnginePacketType::Pong => Self::Pong,
            EnginePacketType::Message => Self::Message(rest.to_string()),
            EnginePacketType::Upgrade => Self::Upgrade,
            EnginePacketType::Noop => Self::Noop,
        })
    }

    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Self::Open(open) => format!(
                "{}{}",
                EnginePacketType::Open.as_u8(),
                serde_json::to_string(open).unwrap_or_default()
            ),
            Self::Close => EnginePacketType::Close.as_u8().to_string(),
            Self::Ping => EnginePacketType::Ping.as_u8().to_string(),
            Self::Pong => EnginePacketType::Pong.as_u8().to_string(),
            Self::Message(data) => format!("{}{data}", EnginePacketType::Message.as_u8()),
            Self::Upgrade => EnginePacketType::Upgrade.as_u8().to_string(),
            Self::Noop => EnginePacketType::Noop.as_u8().to_string(),
        }
    }
}

/// One Socket.IO packet, carried inside an Engine.IO message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketPacket {
    pub kind: SocketPacketType,
    pub namespace: String,
    pub ack_id: Option<u64>,
    pub data: Option<Value>,
}

impl SocketPacket {
    #[must_use]
    pub fn connect(namespace: &str) -> Self {
        Self {
            kind: SocketPacketType::Connect,
            namespace: namespace.to_string(),
            ack_id: None,
            data: None,
        }
    }

    #[must_use]
    pub fn disconnect(namespace: &str) -> Self {
        Self {
            kind: SocketPacketType::Disconnect,
            namespace: namespace.to_string(),
            ack_id: None,
            data: None,
        }
    }

    /// Event packet with a single argument, `["name", payload]`.
    #[must_use]
    pub fn event(namespace: &str, name: &str, payload: Value) -> Self {
        Self {
            kind: SocketPacketType::Event,
            namespace: namespace.to_string(),
            ack_id: None,
            data: Some(json!([name, payload])),
        }
    }

    /// Splits an event packet into its name and first argument.
    #[must_use]
    pub fn into_event(self) -> Option<(String, Value)> {
        if self.kind != SocketPacketType::Event {
            return None;
        }
        let Some(Value::Array(mut args)) = self.data else {
            return None;
        };
        if args.is_empty() {
            return None;
        }

        let Value::String(name) = args.remove(0) else {
            return None;
        };
        let payload = if args.is_empty() {
            Value::Null
        } else {
            args.swap_remove(0)
        };

        Some((name, payload))
    }

    /// # Errors
    ///
    /// Returns error on an unknown type, a bad ack id or invalid JSON data.
    pub fn decode(text: &str) -> RealtimeResult<Self> {
        let (kind, mut rest) = split_type(text)?;
        let kind = SocketPacketType::from_u8(kind)
            .ok_or_else(|| RealtimeError::protocol(format!("unknown socket packet type {kind}")))?;

        // Binary packets carry "<attachments>-" before the namespace.
        if kind.is_binary() {
            let dash = rest
                .find('-')
                .ok_or_else(|| RealtimeError::protocol("binary packet without attachment count"))?;
            rest = &rest[dash + 1..];
        }

        let namespace = if rest.starts_with('/') {
            if let Some(comma) = rest.find(',') {
                let namespace = &rest[..comma];
                rest = &rest[comma + 1..];
                namespace.to_string()
            } else {
                let namespace = rest.to_string();
                rest = "";
                namespace
            }
        } else {
            DEFAULT_NAMESPACE.to_string()
        };

        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        let ack_id = if digits > 0 {
            Some(
                rest[..digits]
                    .parse::<u64>()
                    .map_err(|e| RealtimeError::protocol(format!("invalid ack id: {e}")))?,
            )
        } else {
            None
        };
        rest = &rest[digits..];

        let data = if rest.is_empty() {
            None
        } else {
            Some(serde_json::from_str(rest).map_err(|e| {
                RealtimeError::serialization(format!("invalid packet data: {e}"))
            })?)
        };

        Ok(Self {
            kind,
            namespace,
            ack_id,
            data,
        })
    }

    #[must_use]
    pub fn encode(&self) -> String {
        let mut out = self.kind.as_u8().to_string();

        if self.namespace != DEFAULT_NAMESPACE {
            out.push_str(&self.namespace);
            out.push(',');
        }
        if let Some(id) = self.ack_id {
            let _ = write!(out, "{id}");
        }
        if let Some(data) = &self.data {
            out.push_str(&data.to_string());
        }

        out
    }
}

fn split_type(text: &str) -> RealtimeResult<(u8, &str)> {
    let first = text
        .bytes()
        .next()
        .ok_or_else(|| RealtimeError::protocol("empty packet"))?;

    if !first.is_ascii_digit() {
        return Err(RealtimeError::protocol(format!(
            "packet type must be a digit, got {:?}",
            char::from(first)
        )));
    }

    Ok((first - b'0', &text[1..]))
}
