//! Port definitions for the backend HTTP API and the event channel.

mod backend_port;
mod event_channel_port;

pub use backend_port::BackendPort;
pub use event_channel_port::{ChannelEvent, EventChannelPort};
