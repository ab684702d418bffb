//! Data transfer objects for the application layer.

mod action_dto;
mod lecturer_dto;

pub use action_dto::EnrollPayload;
pub use lecturer_dto::LecturerRegistration;
