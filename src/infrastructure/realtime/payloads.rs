use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Engine.IO handshake sent in the `0` open packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenPayload {
    pub sid: String,
    #[serde(default)]
    pub upgrades: Vec<String>,
    pub ping_interval: u64,
    pub ping_timeout: u64,
    #[serde(default)]
    pub max_payload: u64,
}

/// Socket.IO namespace connect acknowledgement, `40{"sid":...}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectAck {
    pub sid: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ConnectErrorPayload {
    message: String,
}

/// Extracts the reason from a `44` connect error.
///
/// Current servers send `{"message": ...}`; older ones send a bare string.
#[must_use]
pub fn connect_error_message(data: Option<&Value>) -> String {
    match data {
        Some(Value::String(message)) => message.clone(),
        Some(value) => serde_json::from_value::<ConnectErrorPayload>(value.clone())
            .map_or_else(|_| value.to_string(), |payload| payload.message),
        None => "connection refused".to_string(),
    }
}
