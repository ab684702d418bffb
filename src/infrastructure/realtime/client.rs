use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::FutureExt;
use parking_lot::{Mutex, RwLock};
use reqwest::Url;
use serde_json::Value;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{Notify, mpsc};
use tokio::time::sleep;
use tracing::{debug, error, info, trace, warn};

use super::connection::{
    ChannelConnection, ChannelConnectionHandler, OutboundEvent, WebSocketConnection,
};
use super::constants::{
    DEFAULT_NAMESPACE, ENGINE_IO_VERSION, OUTBOUND_BUFFER, RECONNECT_DELAY_BASE,
    RECONNECT_DELAY_MAX, RECONNECT_JITTER_MAX, SOCKET_IO_PATH, TRANSPORT,
};
use super::error::{RealtimeError, RealtimeResult};
use super::state::ChannelState;
use crate::domain::ConnectionStatus;
use crate::domain::errors::ActionError;
use crate::domain::ports::{ChannelEvent, EventChannelPort};

/// Builds a fresh transport for every connect and reconnect attempt.
pub type ConnectionFactory = Arc<dyn Fn() -> Box<dyn ChannelConnection> + Send + Sync>;

/// Factory for real websocket transports.
#[must_use]
pub fn websocket_factory() -> ConnectionFactory {
    Arc::new(|| Box::new(WebSocketConnection::new()) as Box<dyn ChannelConnection>)
}

pub struct ChannelClientConfig {
    pub namespace: String,
    pub auto_reconnect: bool,
    /// Unlimited when `None`.
    pub max_reconnect_attempts: Option<u32>,
}

impl Default for ChannelClientConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            auto_reconnect: true,
            max_reconnect_attempts: None,
        }
    }
}

impl ChannelClientConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    #[must_use]
    pub const fn with_auto_reconnect(mut self, enabled: bool) -> Self {
        self.auto_reconnect = enabled;
        self
    }

    #[must_use]
    pub const fn with_max_reconnect_attempts(mut self, attempts: Option<u32>) -> Self {
        self.max_reconnect_attempts = attempts;
        self
    }
}

/// Socket.IO client for the backend's event channel.
///
/// Emits are queued and written by the connection task, so they can be
/// issued before the first connect and across reconnects.
pub struct ChannelClient {
    config: ChannelClientConfig,
    factory: ConnectionFactory,
    running: Arc<AtomicBool>,
    shutdown: Arc<Notify>,
    status: Arc<RwLock<ConnectionStatus>>,
    outbound_tx: mpsc::Sender<OutboundEvent>,
    outbound_rx: Mutex<Option<mpsc::Receiver<OutboundEvent>>>,
}

impl ChannelClient {
    #[must_use]
    pub fn new(config: ChannelClientConfig) -> Self {
        let (outbound_tx, outbound_rx) = mpsc::channel(OUTBOUND_BUFFER);

        Self {
            config,
            factory: websocket_factory(),
            running: Arc::new(AtomicBool::new(false)),
            shutdown: Arc::new(Notify::new()),
            status: Arc::new(RwLock::new(ConnectionStatus::Disconnected)),
            outbound_tx,
            outbound_rx: Mutex::new(Some(outbound_rx)),
        }
    }

    #[must_use]
    pub fn with_default_config() -> Self {
        Self::new(ChannelClientConfig::default())
    }

    /// Replaces the websocket transport, e.g. with a scripted one.
    #[must_use]
    pub fn with_connection_factory(mut self, factory: ConnectionFactory) -> Self {
        self.factory = factory;
        self
    }

    /// Starts the connection task against `{base_url}/socket.io/`.
    ///
    /// A client connects once; after it stops, queued emits fail with
    /// [`ActionError::ChannelClosed`].
    ///
    /// # Errors
    ///
    /// Returns `RealtimeError::AlreadyConnected` if the client was started
    /// before, or `RealtimeError::InvalidUrl` for a non-http(s) base URL.
    pub fn connect(&self, base_url: &Url) -> RealtimeResult<mpsc::UnboundedReceiver<ChannelEvent>> {
        let url = build_socket_url(base_url)?;
        self.connect_with(url, self.factory.clone())
    }

    fn connect_with(
        &self,
        url: String,
        factory: ConnectionFactory,
    ) -> RealtimeResult<mpsc::UnboundedReceiver<ChannelEvent>> {
        if self.running.load(Ordering::SeqCst) {
            return Err(RealtimeError::AlreadyConnected);
        }
        let outbound = self
            .outbound_rx
            .lock()
            .take()
            .ok_or(RealtimeError::AlreadyConnected)?;

        let (event_tx, event_rx) = mpsc::unbounded_channel();

        info!(url = %url, namespace = %self.config.namespace, "Connecting to event channel");

        let context = LoopContext {
            url,
            namespace: self.config.namespace.clone(),
            auto_reconnect: self.config.auto_reconnect,
            max_attempts: self.config.max_reconnect_attempts,
            factory,
            event_tx: event_tx.clone(),
            running: self.running.clone(),
            shutdown: self.shutdown.clone(),
            status: self.status.clone(),
        };
        let running = self.running.clone();
        let status = self.status.clone();

        running.store(true, Ordering::SeqCst);

        tokio::spawn(async move {
            let result =
                std::panic::AssertUnwindSafe(run_channel_loop(context, outbound)).catch_unwind();

            if let Err(panic_info) = result.await {
                let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    (*s).to_string()
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };

                error!(panic = %panic_msg, "Event channel task panicked");
                running.store(false, Ordering::SeqCst);
                *status.write() = ConnectionStatus::Error;
                let _ = event_tx.send(ChannelEvent::Error {
                    message: format!("Event channel task panicked: {panic_msg}"),
                    recoverable: false,
                });
            }
        });

        Ok(event_rx)
    }

    pub fn disconnect(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.shutdown.notify_one();
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Drop for ChannelClient {
    fn drop(&mut self) {
        self.disconnect();
    }
}

#[async_trait]
impl EventChannelPort for ChannelClient {
    async fn emit(&self, event: &str, payload: Value) -> Result<(), ActionError> {
        self.outbound_tx
            .try_send(OutboundEvent {
                event: event.to_string(),
                payload,
            })
            .map_err(|e| match e {
                TrySendError::Full(rejected) => {
                    warn!(event = %rejected.event, "Outbound queue full");
                    ActionError::unavailable("outbound queue is full")
                }
                TrySendError::Closed(_) => ActionError::ChannelClosed,
            })?;

        trace!(event, status = %self.status(), "Event queued");
        Ok(())
    }

    fn status(&self) -> ConnectionStatus {
        *self.status.read()
    }
}

/// Maps an http(s) base URL to the Socket.IO websocket endpoint.
///
/// # Errors
///
/// Returns error for schemes other than http, https, ws and wss.
pub fn build_socket_url(base_url: &Url) -> RealtimeResult<String> {
    let mut url = base_url.clone();

    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(RealtimeError::invalid_url(format!(
                "unsupported scheme '{other}'"
            )));
        }
    };
    url.set_scheme(scheme)
        .map_err(|()| RealtimeError::invalid_url(format!("cannot use {scheme} for {base_url}")))?;

    url.path_segments_mut()
        .map_err(|()| RealtimeError::invalid_url(format!("{base_url} cannot be a base")))?
        .pop_if_empty()
        .push(SOCKET_IO_PATH)
        .push("");

    url.query_pairs_mut()
        .clear()
        .append_pair("EIO", ENGINE_IO_VERSION)
        .append_pair("transport", TRANSPORT);
    url.set_fragment(None);

    Ok(url.into())
}

struct LoopContext {
    url: String,
    namespace: String,
    auto_reconnect: bool,
    max_attempts: Option<u32>,
    factory: ConnectionFactory,
    event_tx: mpsc::UnboundedSender<ChannelEvent>,
    running: Arc<AtomicBool>,
    shutdown: Arc<Notify>,
    status: Arc<RwLock<ConnectionStatus>>,
}

impl LoopContext {
    fn set_status(&self, status: ConnectionStatus) {
        *self.status.write() = status;
    }

    fn enter(&self, state: ChannelState) {
        debug!(state = %state, "Event channel state changed");
        self.set_status(state.into());
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

enum ConnectionResult {
    Closed,
    Error(RealtimeError),
    Disconnected(RealtimeError),
}

async fn run_channel_loop(context: LoopContext, mut outbound: mpsc::Receiver<OutboundEvent>) {
    let mut reconnect_attempts: u32 = 0;
    let mut final_status = ConnectionStatus::Disconnected;

    while context.is_running() {
        context.enter(if reconnect_attempts == 0 {
            ChannelState::Connecting
        } else {
            ChannelState::Reconnecting {
                attempt: reconnect_attempts,
            }
        });

        let handler = ChannelConnectionHandler::new(
            (context.factory)(),
            context.url.clone(),
            context.namespace.clone(),
            context.event_tx.clone(),
        );

        match run_single_connection(handler, &mut outbound, &context).await {
            ConnectionResult::Closed => break,
            ConnectionResult::Error(e) => {
                error!(error = %e, "Failed to connect to event channel");

                let retry = e.should_reconnect() && context.auto_reconnect;
                let _ = context.event_tx.send(ChannelEvent::Error {
                    message: e.to_string(),
                    recoverable: retry,
                });

                if !retry {
                    final_status = ConnectionStatus::Error;
                    break;
                }

                reconnect_attempts += 1;
            }
            ConnectionResult::Disconnected(e) => {
                warn!(error = %e, "Event channel connection lost");

                let _ = context.event_tx.send(ChannelEvent::Disconnected {
                    reason: e.to_string(),
                });

                if !e.should_reconnect() || !context.auto_reconnect {
                    break;
                }

                reconnect_attempts = 1;
            }
        }

        if !context.is_running() {
            break;
        }

        if let Some(max_attempts) = context.max_attempts
            && reconnect_attempts > max_attempts
        {
            let e = RealtimeError::ReconnectionLimitExceeded {
                attempts: max_attempts,
            };
            error!(error = %e, "Giving up on event channel");
            let _ = context.event_tx.send(ChannelEvent::Error {
                message: e.to_string(),
                recoverable: false,
            });
            final_status = ConnectionStatus::Error;
            break;
        }

        let delay = calculate_backoff_delay(reconnect_attempts);
        info!(
            attempt = reconnect_attempts,
            delay_ms = delay.as_millis(),
            "Reconnecting to event channel"
        );

        context.enter(ChannelState::Reconnecting {
            attempt: reconnect_attempts,
        });
        let _ = context.event_tx.send(ChannelEvent::Reconnecting {
            attempt: reconnect_attempts,
        });

        tokio::select! {
            () = sleep(delay) => {}
            () = context.shutdown.notified() => break,
        }
    }

    context.running.store(false, Ordering::SeqCst);
    context.set_status(final_status);
    info!(status = %final_status, "Event channel loop terminated");
}

async fn run_single_connection(
    mut handler: ChannelConnectionHandler,
    outbound: &mut mpsc::Receiver<OutboundEvent>,
    context: &LoopContext,
) -> ConnectionResult {
    let connected = tokio::select! {
        result = handler.connect() => result,
        () = context.shutdown.notified() => return ConnectionResult::Closed,
    };

    if let Err(e) = connected {
        return ConnectionResult::Error(e);
    }

    context.enter(ChannelState::Connected);
    info!("Event channel connected");

    match handler.run(outbound, &context.shutdown).await {
        Ok(()) => ConnectionResult::Closed,
        Err(e) => ConnectionResult::Disconnected(e),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn calculate_backoff_delay(attempt: u32) -> Duration {
    let base_delay = RECONNECT_DELAY_BASE.as_millis() as u64;
    let max_delay = RECONNECT_DELAY_MAX.as_millis() as u64;
    let jitter_max = RECONNECT_JITTER_MAX.as_millis() as u64;

    let exponent = attempt.saturating_sub(1).min(6);
    let exponential_delay = base_delay.saturating_mul(2_u64.saturating_pow(exponent));
    let capped_delay = exponential_delay.min(max_delay);

    let jitter = rand_jitter(jitter_max);
    let total_delay = capped_delay.saturating_add(jitter);

    Duration::from_millis(total_delay)
}

fn rand_jitter(max: u64) -> u64 {
    use std::time::SystemTime;

    if max == 0 {
        return 0;
    }

    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| u64::from(d.subsec_nanos()))
        .unwrap_or(0);

    nanos % max
}

#[cfg(test)]
mod tests {
    use super::super::codec::EnginePacket;
    use super::super::connection::fake::{ScriptedConnection, pair};
    use super::*;
    use serde_json::json;
    use std::collections::VecDeque;

    const URL: &str = "ws://localhost:5000/socket.io/?EIO=4&transport=websocket";

    fn scripted(connections: Vec<ScriptedConnection>) -> ConnectionFactory {
        let queue = Arc::new(Mutex::new(VecDeque::from(connections)));
        Arc::new(move || {
            let next = queue.lock().pop_front();
            next.map_or_else(
                || {
                    let (connection, _server) = pair();
                    Box::new(connection) as Box<dyn ChannelConnection>
                },
                |connection| Box::new(connection) as Box<dyn ChannelConnection>,
            )
        })
    }

    #[test]
    fn test_config_builder() {
        let config = ChannelClientConfig::new()
            .with_auto_reconnect(false)
            .with_max_reconnect_attempts(Some(5))
            .with_namespace("/attendance");

        assert!(!config.auto_reconnect);
        assert_eq!(config.max_reconnect_attempts, Some(5));
        assert_eq!(config.namespace, "/attendance");
    }

    #[test]
    fn test_backoff_delay() {
        let delay1 = calculate_backoff_delay(1);
        let delay2 = calculate_backoff_delay(2);
        let delay3 = calculate_backoff_delay(3);

        assert!(delay1 >= RECONNECT_DELAY_BASE);
        assert!(delay1 < delay2);
        assert!(delay2 < delay3);

        let delay_max = calculate_backoff_delay(100);
        assert!(delay_max <= RECONNECT_DELAY_MAX + RECONNECT_JITTER_MAX);
    }

    #[test]
    fn test_socket_url() {
        let url = build_socket_url(&Url::parse("http://localhost:5000").unwrap()).unwrap();
        assert_eq!(url, URL);

        let url = build_socket_url(&Url::parse("https://uni.edu/api/").unwrap()).unwrap();
        assert_eq!(url, "wss://uni.edu/api/socket.io/?EIO=4&transport=websocket");

        assert!(build_socket_url(&Url::parse("ftp://uni.edu").unwrap()).is_err());
    }

    #[test]
    fn test_client_initial_state() {
        let client = ChannelClient::with_default_config();
        assert!(!client.is_running());
        assert_eq!(client.status(), ConnectionStatus::Disconnected);
    }

    #[tokio::test]
    async fn test_emit_before_connect_is_flushed() {
        let client = ChannelClient::with_default_config();
        client
            .emit("enroll", json!({"matricNo": "M100"}))
            .await
            .unwrap();

        let (connection, mut server) = pair();
        server.accept("sio-1");
        let mut events = client
            .connect_with(URL.to_string(), scripted(vec![connection]))
            .unwrap();

        assert_eq!(
            events.recv().await,
            Some(ChannelEvent::Connected {
                session_id: "sio-1".to_string()
            })
        );
        assert_eq!(server.next_sent().await, EnginePacket::Message("0".to_string()));
        assert_eq!(
            server.next_sent().await,
            EnginePacket::Message(r#"2["enroll",{"matricNo":"M100"}]"#.to_string())
        );
        assert_eq!(client.status(), ConnectionStatus::Connected);
        assert!(matches!(
            client.connect_with(URL.to_string(), scripted(Vec::new())),
            Err(RealtimeError::AlreadyConnected)
        ));
    }

    #[tokio::test]
    async fn test_full_queue_fails_emit() {
        let client = ChannelClient::with_default_config();

        for _ in 0..OUTBOUND_BUFFER {
            client.emit("attendance", json!({})).await.unwrap();
        }

        assert!(matches!(
            client.emit("attendance", json!({})).await,
            Err(ActionError::ChannelUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_rejection_stops_client() {
        let client = ChannelClient::with_default_config();
        let (connection, server) = pair();
        server.push(
            EnginePacket::decode(
                r#"0{"sid":"e","upgrades":[],"pingInterval":25000,"pingTimeout":20000}"#,
            )
            .unwrap(),
        );
        server.push_socket(r#"4{"message":"Not authorized"}"#);

        let mut events = client
            .connect_with(URL.to_string(), scripted(vec![connection]))
            .unwrap();

        assert_eq!(
            events.recv().await,
            Some(ChannelEvent::Error {
                message: "connection rejected by server: Not authorized".to_string(),
                recoverable: false,
            })
        );
        assert_eq!(events.recv().await, None);
        assert_eq!(client.status(), ConnectionStatus::Error);
        assert!(!client.is_running());
        assert_eq!(
            client.emit("enroll", json!({})).await,
            Err(ActionError::ChannelClosed)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconnects_after_drop() {
        let client = ChannelClient::with_default_config();
        let (first, first_server) = pair();
        first_server.accept("a");
        let (second, second_server) = pair();
        second_server.accept("b");

        let mut events = client
            .connect_with(URL.to_string(), scripted(vec![first, second]))
            .unwrap();

        assert_eq!(
            events.recv().await,
            Some(ChannelEvent::Connected {
                session_id: "a".to_string()
            })
        );

        drop(first_server);

        assert!(matches!(
            events.recv().await,
            Some(ChannelEvent::Disconnected { .. })
        ));
        assert_eq!(
            events.recv().await,
            Some(ChannelEvent::Reconnecting { attempt: 1 })
        );
        assert_eq!(
            events.recv().await,
            Some(ChannelEvent::Connected {
                session_id: "b".to_string()
            })
        );
        assert_eq!(client.status(), ConnectionStatus::Connected);
        drop(second_server);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconnect_limit() {
        let client = ChannelClient::new(
            ChannelClientConfig::new().with_max_reconnect_attempts(Some(1)),
        );

        let mut events = client
            .connect_with(URL.to_string(), scripted(Vec::new()))
            .unwrap();

        let mut last = None;
        while let Some(event) = events.recv().await {
            last = Some(event);
        }

        assert_eq!(
            last,
            Some(ChannelEvent::Error {
                message: "reconnection limit exceeded after 1 attempts".to_string(),
                recoverable: false,
            })
        );
        assert_eq!(client.status(), ConnectionStatus::Error);
    }

    #[tokio::test]
    async fn test_disconnect_stops_loop() {
        let client = ChannelClient::with_default_config();
        let (connection, mut server) = pair();
        server.accept("sio-1");

        let mut events = client
            .connect_with(URL.to_string(), scripted(vec![connection]))
            .unwrap();
        let _ = events.recv().await;
        let _ = server.next_sent().await;

        client.disconnect();

        assert_eq!(events.recv().await, None);
        assert_eq!(server.next_sent().await, EnginePacket::Message("1".to_string()));
        assert_eq!(client.status(), ConnectionStatus::Disconnected);
    }
}
