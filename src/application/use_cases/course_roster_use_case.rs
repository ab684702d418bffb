//! Enrolled students and attendance records of a course.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::entities::{AttendanceRecord, CourseCode, Student};
use crate::domain::errors::BackendError;
use crate::domain::ports::BackendPort;

/// Reads who is enrolled in a course and who attended it.
#[derive(Clone)]
pub struct CourseRosterUseCase {
    backend: Arc<dyn BackendPort>,
}

impl CourseRosterUseCase {
    /// Creates new use case.
    #[must_use]
    pub const fn new(backend: Arc<dyn BackendPort>) -> Self {
        Self { backend }
    }

    /// Fetches students enrolled in the course.
    ///
    /// # Errors
    /// Returns error if the backend request fails.
    pub async fn enrolled_students(
        &self,
        course_code: &CourseCode,
    ) -> Result<Vec<Student>, BackendError> {
        debug!(course = %course_code, "Fetching enrolled students");

        self.backend
            .fetch_enrolled_students(course_code)
            .await
            .map_err(|e| {
                warn!(course = %course_code, error = %e, "Error fetching enrolled students");
                e
            })
    }

    /// Fetches attendance records of the course.
    ///
    /// # Errors
    /// Returns error if the backend request fails.
    pub async fn attendance_records(
        &self,
        course_code: &CourseCode,
    ) -> Result<Vec<AttendanceRecord>, BackendError> {
        debug!(course = %course_code, "Fetching attendance records");

        self.backend
            .fetch_attendance_records(course_code)
            .await
            .map_err(|e| {
                warn!(course = %course_code, error = %e, "Error fetching attendance records");
                e
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::mocks::MockBackendPort;

    #[tokio::test]
    async fn test_enrolled_students_uses_course_code() {
        let mut backend = MockBackendPort::new();
        backend
            .expect_fetch_enrolled_students()
            .withf(|code| code.as_str() == "CS 101")
            .returning(|_| Ok(vec![Student::new("s1", "Ada", "M100")]));

        let use_case = CourseRosterUseCase::new(Arc::new(backend));
        let students = use_case
            .enrolled_students(&CourseCode::new("CS 101"))
            .await
            .unwrap();

        assert_eq!(students[0].matric_no().as_str(), "M100");
    }

    #[tokio::test]
    async fn test_attendance_records_error() {
        let mut backend = MockBackendPort::new();
        backend
            .expect_fetch_attendance_records()
            .returning(|_| Err(BackendError::status(404, "course not found")));

        let use_case = CourseRosterUseCase::new(Arc::new(backend));
        let result = use_case.attendance_records(&CourseCode::new("XX")).await;

        assert!(matches!(result, Err(BackendError::Status { status: 404, .. })));
    }
}
