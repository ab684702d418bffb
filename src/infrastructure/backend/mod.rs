//! Attendance backend HTTP API.

mod client;
mod dto;

pub use client::BackendClient;
