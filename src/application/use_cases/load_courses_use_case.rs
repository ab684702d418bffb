//! Course list use case.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::entities::{Course, LecturerEmail};
use crate::domain::errors::BackendError;
use crate::domain::ports::BackendPort;

/// Loads the courses a lecturer teaches.
#[derive(Clone)]
pub struct LoadCoursesUseCase {
    backend: Arc<dyn BackendPort>,
}

impl LoadCoursesUseCase {
    /// Creates new use case.
    #[must_use]
    pub const fn new(backend: Arc<dyn BackendPort>) -> Self {
        Self { backend }
    }

    /// Fetches the lecturer's courses.
    ///
    /// # Errors
    /// Returns error if the backend request fails.
    pub async fn execute(&self, lecturer: &LecturerEmail) -> Result<Vec<Course>, BackendError> {
        debug!(lecturer = %lecturer, "Fetching courses");

        let courses = self.backend.fetch_courses(lecturer).await.map_err(|e| {
            warn!(lecturer = %lecturer, error = %e, "Error fetching courses");
            e
        })?;

        debug!(count = courses.len(), "Courses fetched");
        Ok(courses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::mocks::MockBackendPort;

    #[tokio::test]
    async fn test_fetches_for_lecturer() {
        let mut backend = MockBackendPort::new();
        backend
            .expect_fetch_courses()
            .withf(|lecturer| lecturer.as_str() == "joelojerinde@gmail.com")
            .times(1)
            .returning(|_| Ok(vec![Course::new("c1", "CS101", "Intro")]));

        let use_case = LoadCoursesUseCase::new(Arc::new(backend));
        let lecturer = LecturerEmail::parse("joelojerinde@gmail.com").unwrap();

        let courses = use_case.execute(&lecturer).await.unwrap();

        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].course_code().as_str(), "CS101");
    }

    #[tokio::test]
    async fn test_propagates_backend_error() {
        let mut backend = MockBackendPort::new();
        backend
            .expect_fetch_courses()
            .returning(|_| Err(BackendError::network("connection refused")));

        let use_case = LoadCoursesUseCase::new(Arc::new(backend));
        let lecturer = LecturerEmail::parse("l@uni.edu").unwrap();

        let result = use_case.execute(&lecturer).await;

        assert!(matches!(result, Err(BackendError::Network { .. })));
    }
}
