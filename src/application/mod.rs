//! Application layer with use cases, services and DTOs.

/// Data transfer objects.
pub mod dto;
/// Stateful services shared by views.
pub mod services;
/// Use case implementations.
pub mod use_cases;

pub use dto::{EnrollPayload, LecturerRegistration};
pub use services::{EventBridge, FeedbackSubscription, FormController, FormKind, PendingAction};
pub use use_cases::{
    CourseRosterUseCase, LegacySubmissionUseCase, LoadCoursesUseCase, RegisterLecturerUseCase,
};
