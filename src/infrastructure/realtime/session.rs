use super::payloads::OpenPayload;

/// Identifiers and heartbeat settings of the current connection.
#[derive(Debug, Clone, Default)]
pub struct SessionInfo {
    engine_sid: Option<String>,
    socket_sid: Option<String>,
    ping_interval_ms: Option<u64>,
    ping_timeout_ms: Option<u64>,
    max_payload: Option<u64>,
}

impl SessionInfo {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            engine_sid: None,
            socket_sid: None,
            ping_interval_ms: None,
            ping_timeout_ms: None,
            max_payload: None,
        }
    }

    pub fn set_open(&mut self, open: &OpenPayload) {
        self.engine_sid = Some(open.sid.clone());
        self.ping_interval_ms = Some(open.ping_interval);
        self.ping_timeout_ms = Some(open.ping_timeout);
        self.max_payload = (open.max_payload > 0).then_some(open.max_payload);
    }

    pub fn set_socket_sid(&mut self, sid: String) {
        self.socket_sid = Some(sid);
    }

    #[must_use]
    pub fn engine_sid(&self) -> Option<&str> {
        self.engine_sid.as_deref()
    }

    #[must_use]
    pub fn socket_sid(&self) -> Option<&str> {
        self.socket_sid.as_deref()
    }

    /// Returns `(ping_interval_ms, ping_timeout_ms)` once the open packet arrived.
    #[must_use]
    pub const fn ping_settings(&self) -> Option<(u64, u64)> {
        match (self.ping_interval_ms, self.ping_timeout_ms) {
            (Some(interval), Some(timeout)) => Some((interval, timeout)),
            _ => None,
        }
    }

    /// Returns whether an outgoing frame of `len` bytes fits the server limit.
    #[must_use]
    pub fn fits_payload(&self, len: usize) -> bool {
        self.max_payload
            .is_none_or(|max| u64::try_from(len).is_ok_and(|len| len <= max))
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }
}
