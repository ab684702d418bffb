use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::{Notify, mpsc};
use tokio::time::{Instant, sleep_until, timeout, timeout_at};
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, trace, warn};

use super::codec::{EnginePacket, SocketPacket};
use super::constants::{CONNECT_ACK_TIMEOUT, CONNECTION_TIMEOUT, OPEN_TIMEOUT, SocketPacketType};
use super::error::{RealtimeError, RealtimeResult};
use super::heartbeat::PingMonitor;
use super::payloads::{ConnectAck, connect_error_message};
use super::session::SessionInfo;
use super::state::ChannelState;
use crate::domain::ports::ChannelEvent;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsWriter = SplitSink<WsStream, WsMessage>;
type WsReader = SplitStream<WsStream>;

/// Event waiting to be written to the socket.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundEvent {
    pub event: String,
    pub payload: Value,
}

#[async_trait]
pub trait ChannelConnection: Send + Sync {
    async fn connect(&mut self, url: &str) -> RealtimeResult<()>;
    async fn disconnect(&mut self) -> RealtimeResult<()>;
    async fn send(&mut self, packet: &EnginePacket) -> RealtimeResult<()>;
    async fn receive(&mut self) -> RealtimeResult<EnginePacket>;
    fn is_connected(&self) -> bool;
}

pub struct WebSocketConnection {
    writer: Option<WsWriter>,
    reader: Option<WsReader>,
    connected: bool,
}

impl WebSocketConnection {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            writer: None,
            reader: None,
            connected: false,
        }
    }
}

impl Default for WebSocketConnection {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChannelConnection for WebSocketConnection {
    async fn connect(&mut self, url: &str) -> RealtimeResult<()> {
        let (ws_stream, _) = timeout(CONNECTION_TIMEOUT, connect_async(url))
            .await
            .map_err(|_| RealtimeError::timeout("connection"))?
            .map_err(|e| RealtimeError::connection_failed(e.to_string()))?;

        let (writer, reader) = ws_stream.split();
        self.writer = Some(writer);
        self.reader = Some(reader);
        self.connected = true;

        Ok(())
    }

    async fn disconnect(&mut self) -> RealtimeResult<()> {
        if let Some(mut writer) = self.writer.take() {
            let _ = writer.close().await;
        }
        self.reader = None;
        self.connected = false;
        debug!("WebSocket connection closed");
        Ok(())
    }

    async fn send(&mut self, packet: &EnginePacket) -> RealtimeResult<()> {
        let writer = self.writer.as_mut().ok_or(RealtimeError::NotConnected)?;

        writer
            .send(WsMessage::Text(packet.encode().into()))
            .await
            .map_err(|e| RealtimeError::websocket(e.to_string()))?;

        Ok(())
    }

    async fn receive(&mut self) -> RealtimeResult<EnginePacket> {
        let reader = self.reader.as_mut().ok_or(RealtimeError::NotConnected)?;

        loop {
            match reader.next().await {
                Some(Ok(WsMessage::Text(text))) => {
                    return EnginePacket::decode(&text);
                }
                Some(Ok(WsMessage::Binary(data))) => {
                    debug!(len = data.len(), "Skipping binary frame");
                }
                Some(Ok(WsMessage::Close(frame))) => {
                    self.connected = false;
                    let (code, reason) = frame.map_or_else(
                        || (1000, "Normal closure".to_string()),
                        |f| (f.code.into(), f.reason.to_string()),
                    );

                    return Err(RealtimeError::ConnectionClosed { code, reason });
                }
                Some(Ok(WsMessage::Ping(data))) => {
                    if let Some(writer) = self.writer.as_mut() {
                        let _ = writer.send(WsMessage::Pong(data)).await;
                    }
                }
                Some(Ok(WsMessage::Pong(_) | WsMessage::Frame(_))) => {}
                Some(Err(e)) => {
                    self.connected = false;
                    return Err(RealtimeError::websocket(e.to_string()));
                }
                None => {
                    self.connected = false;
                    return Err(RealtimeError::ConnectionClosed {
                        code: 1000,
                        reason: "Stream ended".to_string(),
                    });
                }
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

/// Drives one socket from handshake to close.
pub struct ChannelConnectionHandler {
    connection: Box<dyn ChannelConnection>,
    url: String,
    namespace: String,
    state: ChannelState,
    session: SessionInfo,
    event_tx: mpsc::UnboundedSender<ChannelEvent>,
}

impl ChannelConnectionHandler {
    pub fn new(
        connection: Box<dyn ChannelConnection>,
        url: String,
        namespace: String,
        event_tx: mpsc::UnboundedSender<ChannelEvent>,
    ) -> Self {
        Self {
            connection,
            url,
            namespace,
            state: ChannelState::Disconnected,
            session: SessionInfo::new(),
            event_tx,
        }
    }

    /// Opens the socket and joins the namespace.
    ///
    /// # Errors
    ///
    /// Returns error if the socket cannot be opened, a handshake step times
    /// out or the server refuses the namespace.
    pub async fn connect(&mut self) -> RealtimeResult<()> {
        self.state = ChannelState::Connecting;
        self.connection.connect(&self.url).await?;

        self.state = ChannelState::WaitingForOpen;
        self.await_open().await?;

        self.state = ChannelState::JoiningNamespace;
        let connect = EnginePacket::socket(&SocketPacket::connect(&self.namespace));
        self.connection.send(&connect).await?;

        self.await_connect_ack().await
    }

    async fn await_open(&mut self) -> RealtimeResult<()> {
        let packet = timeout(OPEN_TIMEOUT, self.connection.receive())
            .await
            .map_err(|_| RealtimeError::timeout("open packet"))??;

        let EnginePacket::Open(open) = packet else {
            return Err(RealtimeError::protocol(format!(
                "expected open packet, got {packet:?}"
            )));
        };

        debug!(
            sid = %open.sid,
            ping_interval_ms = open.ping_interval,
            ping_timeout_ms = open.ping_timeout,
            "Received open packet"
        );
        self.session.set_open(&open);

        Ok(())
    }

    async fn await_connect_ack(&mut self) -> RealtimeResult<()> {
        let deadline = Instant::now() + CONNECT_ACK_TIMEOUT;

        loop {
            let packet = timeout_at(deadline, self.connection.receive())
                .await
                .map_err(|_| RealtimeError::timeout("namespace connect"))??;

            let text = match packet {
                EnginePacket::Message(text) => text,
                EnginePacket::Ping => {
                    self.connection.send(&EnginePacket::Pong).await?;
                    continue;
                }
                EnginePacket::Noop | EnginePacket::Pong => continue,
                EnginePacket::Close => return Err(transport_closed()),
                other => {
                    return Err(RealtimeError::protocol(format!(
                        "unexpected {other:?} during handshake"
                    )));
                }
            };

            let packet = SocketPacket::decode(&text)?;
            if packet.namespace != self.namespace {
                debug!(namespace = %packet.namespace, "Ignoring packet for other namespace");
                continue;
            }

            match packet.kind {
                SocketPacketType::Connect => {
                    let sid = packet
                        .data
                        .and_then(|data| serde_json::from_value::<ConnectAck>(data).ok())
                        .map(|ack| ack.sid)
                        .ok_or_else(|| RealtimeError::protocol("connect ack without sid"))?;

                    self.session.set_socket_sid(sid.clone());
                    self.state = ChannelState::Connected;
                    info!(sid = %sid, namespace = %self.namespace, "Joined namespace");

                    let _ = self
                        .event_tx
                        .send(ChannelEvent::Connected { session_id: sid });
                    return Ok(());
                }
                SocketPacketType::ConnectError => {
                    return Err(RealtimeError::rejected(connect_error_message(
                        packet.data.as_ref(),
                    )));
                }
                other => {
                    debug!(kind = ?other, "Ignoring packet before namespace connect");
                }
            }
        }
    }

    /// Pumps the socket until it closes, the ping deadline passes, the
    /// outbound queue closes or shutdown is signalled.
    ///
    /// # Errors
    ///
    /// Returns the error that ended the connection.
    pub async fn run(
        &mut self,
        outbound: &mut mpsc::Receiver<OutboundEvent>,
        shutdown: &Notify,
    ) -> RealtimeResult<()> {
        let (ping_interval, ping_timeout) = self
            .session
            .ping_settings()
            .ok_or(RealtimeError::NotConnected)?;
        let mut monitor = PingMonitor::new(ping_interval, ping_timeout);

        while self.state.is_connected() {
            tokio::select! {
                result = self.connection.receive() => {
                    let packet = result?;
                    self.handle_packet(packet, &mut monitor).await?;
                }

                queued = outbound.recv() => {
                    let Some(event) = queued else {
                        self.close().await;
                        return Ok(());
                    };
                    self.send_event(event).await?;
                }

                () = sleep_until(monitor.deadline()) => {
                    let window_ms = u64::try_from(monitor.window().as_millis()).unwrap_or(u64::MAX);
                    warn!(window_ms, "No ping from server");
                    return Err(RealtimeError::PingTimeout { window_ms });
                }

                () = shutdown.notified() => {
                    self.close().await;
                    return Ok(());
                }
            }
        }

        Ok(())
    }

    async fn handle_packet(
        &mut self,
        packet: EnginePacket,
        monitor: &mut PingMonitor,
    ) -> RealtimeResult<()> {
        match packet {
            EnginePacket::Ping => {
                monitor.record_ping();
                trace!(pings = monitor.pings(), "Ping");
                self.connection.send(&EnginePacket::Pong).await?;
            }
            EnginePacket::Message(text) => self.handle_socket_packet(&text)?,
            EnginePacket::Close => return Err(transport_closed()),
            EnginePacket::Noop | EnginePacket::Pong => {}
            EnginePacket::Open(_) | EnginePacket::Upgrade => {
                debug!("Ignoring handshake packet on open connection");
            }
        }

        Ok(())
    }

    fn handle_socket_packet(&self, text: &str) -> RealtimeResult<()> {
        let packet = match SocketPacket::decode(text) {
            Ok(packet) => packet,
            Err(e) => {
                warn!(error = %e, "Dropping malformed socket packet");
                return Ok(());
            }
        };

        if packet.namespace != self.namespace {
            debug!(namespace = %packet.namespace, "Ignoring packet for other namespace");
            return Ok(());
        }

        let kind = packet.kind;
        match kind {
            SocketPacketType::Event => {
                if let Some((event, payload)) = packet.into_event() {
                    trace!(event = %event, "Event received");
                    let _ = self.event_tx.send(ChannelEvent::Message { event, payload });
                } else {
                    warn!("Event packet without a name");
                }
            }
            SocketPacketType::Disconnect => {
                info!("Server disconnected the socket");
                return Err(RealtimeError::ServerDisconnect);
            }
            SocketPacketType::ConnectError => {
                return Err(RealtimeError::rejected(connect_error_message(
                    packet.data.as_ref(),
                )));
            }
            SocketPacketType::Connect | SocketPacketType::Ack => {
                debug!(kind = ?kind, "Ignoring packet");
            }
            SocketPacketType::BinaryEvent | SocketPacketType::BinaryAck => {
                warn!(kind = ?kind, "Binary packets are not supported, skipping");
            }
        }

        Ok(())
    }

    async fn send_event(&mut self, event: OutboundEvent) -> RealtimeResult<()> {
        let body = SocketPacket::event(&self.namespace, &event.event, event.payload).encode();

        if !self.session.fits_payload(body.len() + 1) {
            warn!(event = %event.event, len = body.len(), "Event exceeds server payload limit, dropped");
            let _ = self.event_tx.send(ChannelEvent::Error {
                message: format!("{} exceeds the server payload limit", event.event),
                recoverable: true,
            });
            return Ok(());
        }

        debug!(event = %event.event, "Emitting event");
        self.connection.send(&EnginePacket::Message(body)).await
    }

    async fn close(&mut self) {
        self.state = ChannelState::ShuttingDown;
        let disconnect = EnginePacket::socket(&SocketPacket::disconnect(&self.namespace));
        let _ = self.connection.send(&disconnect).await;
        let _ = self.connection.disconnect().await;
        debug!("Channel connection closed");
    }

    #[must_use]
    pub const fn session(&self) -> &SessionInfo {
        &self.session
    }

    #[must_use]
    pub const fn state(&self) -> ChannelState {
        self.state
    }
}

fn transport_closed() -> RealtimeError {
    RealtimeError::ConnectionClosed {
        code: 1000,
        reason: "server closed the transport".to_string(),
    }
}
