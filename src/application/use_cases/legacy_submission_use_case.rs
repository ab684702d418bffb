//! Enroll and attendance over plain HTTP.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::domain::entities::{LecturerEmail, StudentSubmission};
use crate::domain::errors::BackendError;
use crate::domain::ports::BackendPort;

/// Submits student forms through the HTTP endpoints that predate the event
/// channel. The response is the whole outcome; there is no feedback event.
#[derive(Clone)]
pub struct LegacySubmissionUseCase {
    backend: Arc<dyn BackendPort>,
}

impl LegacySubmissionUseCase {
    /// Creates new use case.
    #[must_use]
    pub const fn new(backend: Arc<dyn BackendPort>) -> Self {
        Self { backend }
    }

    /// Enrolls a student via `POST /courses/enroll/{lecturerEmail}`.
    ///
    /// # Errors
    /// Returns error if the backend request fails.
    pub async fn enroll(
        &self,
        lecturer: &LecturerEmail,
        submission: &StudentSubmission,
    ) -> Result<Value, BackendError> {
        debug!(
            course = %submission.course_code(),
            matric_no = %submission.matric_no(),
            "Submitting enrollment"
        );

        let record = self
            .backend
            .enroll_student(lecturer, submission)
            .await
            .map_err(|e| {
                warn!(error = %e, "Error submitting enrollment data");
                e
            })?;

        info!(matric_no = %submission.matric_no(), "Enrolled");
        Ok(record)
    }

    /// Marks attendance via `POST /courses/attendance`.
    ///
    /// # Errors
    /// Returns error if the backend request fails.
    pub async fn mark_attendance(
        &self,
        submission: &StudentSubmission,
    ) -> Result<Value, BackendError> {
        debug!(
            course = %submission.course_code(),
            matric_no = %submission.matric_no(),
            "Submitting attendance"
        );

        let confirmation = self
            .backend
            .mark_attendance(submission)
            .await
            .map_err(|e| {
                warn!(error = %e, "Error submitting attendance data");
                e
            })?;

        info!(matric_no = %submission.matric_no(), "Attendance marked");
        Ok(confirmation)
    }
}
