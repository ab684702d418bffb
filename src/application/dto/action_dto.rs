//! Event channel payload DTOs.

use serde::Serialize;

use crate::domain::entities::{LecturerEmail, StudentSubmission};

/// Body of the `enroll` event: the submission plus the lecturer's email.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollPayload<'a> {
    /// Form fields and course.
    #[serde(flatten)]
    pub submission: &'a StudentSubmission,
    /// Lecturer the enrollment is recorded under.
    pub lecturer_email: &'a LecturerEmail,
}

impl<'a> EnrollPayload<'a> {
    /// Creates an enroll payload.
    #[must_use]
    pub const fn new(submission: &'a StudentSubmission, lecturer_email: &'a LecturerEmail) -> Self {
        Self {
            submission,
            lecturer_email,
        }
    }
}
