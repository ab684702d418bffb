//! Infrastructure layer with external service adapters.

/// Backend HTTP client.
pub mod backend;
/// Application configuration.
pub mod config;
/// Socket.IO event channel.
pub mod realtime;

pub use backend::BackendClient;
pub use config::{AppConfig, CliArgs, Command, ConfigError, LogLevel, StorageManager};
pub use realtime::{ChannelClient, ChannelClientConfig};
