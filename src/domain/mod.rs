//! Domain layer with core entities and port definitions.

/// Connection status definitions.
pub mod connection;
/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;

pub use connection::ConnectionStatus;
pub use entities::{ActionKind, Course, LecturerEmail, Student};
pub use errors::{ActionError, BackendError};
pub use ports::{BackendPort, EventChannelPort};
