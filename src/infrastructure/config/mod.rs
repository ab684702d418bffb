//! Application configuration.

pub mod app_config;
pub mod args;
pub mod storage;

pub use app_config::{AppConfig, ChannelConfig, LogLevel};
pub use args::{CliArgs, Command, StudentArgs};
pub use storage::{ConfigError, StorageManager};
