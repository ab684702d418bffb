//! Socket.IO event channel client over a websocket-only Engine.IO transport.

mod client;
mod codec;
mod connection;
mod constants;
mod error;
mod heartbeat;
mod payloads;
mod session;
mod state;

pub use client::{
    ChannelClient, ChannelClientConfig, ConnectionFactory, build_socket_url, websocket_factory,
};
pub use codec::{EnginePacket, SocketPacket};
pub use connection::{ChannelConnection, OutboundEvent, WebSocketConnection};
#[cfg(test)]
pub use connection::fake;
pub use error::{RealtimeError, RealtimeResult};
pub use state::ChannelState;
