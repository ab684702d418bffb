//! Rollcall - a lecturer client for a classroom attendance backend.
//!
//! Lists a lecturer's courses, enrolls students, takes attendance and removes
//! students. Submissions go over a Socket.IO event channel and are confirmed
//! by feedback events; reads go over the HTTP API.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing use cases, services and DTOs.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing adapters for external services.
pub mod infrastructure;
/// Presentation layer containing views and the command runner.
pub mod presentation;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "rollcall";
