//! Lecturer registration use case.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::application::dto::LecturerRegistration;
use crate::domain::entities::{CourseDraft, LecturerEmail, NewLecturer};
use crate::domain::errors::SubmitError;
use crate::domain::ports::BackendPort;

/// Registers a lecturer and the courses they teach.
#[derive(Clone)]
pub struct RegisterLecturerUseCase {
    backend: Arc<dyn BackendPort>,
}

impl RegisterLecturerUseCase {
    /// Creates new use case.
    #[must_use]
    pub const fn new(backend: Arc<dyn BackendPort>) -> Self {
        Self { backend }
    }

    /// Validates the form and posts it.
    ///
    /// # Errors
    /// Returns a validation error before any request is made, or the backend
    /// error if the request fails.
    pub async fn execute(&self, registration: LecturerRegistration) -> Result<Value, SubmitError> {
        let email = LecturerEmail::parse(registration.email)?;
        let courses = registration
            .courses
            .into_iter()
            .map(|(code, name)| CourseDraft::new(code, name))
            .collect();
        let lecturer = NewLecturer::new(registration.name, email, courses)?;

        debug!(
            email = %lecturer.email(),
            courses = lecturer.courses().len(),
            "Registering lecturer"
        );

        let created = self.backend.create_lecturer(&lecturer).await.map_err(|e| {
            warn!(error = %e, "Error creating lecturer");
            e
        })?;

        info!(email = %lecturer.email(), "Lecturer registered");
        Ok(created)
    }
}
