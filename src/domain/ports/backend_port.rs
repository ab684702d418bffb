//! Backend HTTP API port definition.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::entities::{
    AttendanceRecord, Course, CourseCode, LecturerEmail, NewLecturer, Student, StudentSubmission,
};
use crate::domain::errors::BackendError;

/// Port for the attendance backend's HTTP API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BackendPort: Send + Sync {
    /// Fetches the courses taught by the lecturer.
    async fn fetch_courses(&self, lecturer: &LecturerEmail) -> Result<Vec<Course>, BackendError>;

    /// Fetches students enrolled in a course.
    async fn fetch_enrolled_students(
        &self,
        course_code: &CourseCode,
    ) -> Result<Vec<Student>, BackendError>;

    /// Fetches all attendance records of a course.
    async fn fetch_attendance_records(
        &self,
        course_code: &CourseCode,
    ) -> Result<Vec<AttendanceRecord>, BackendError>;

    /// Enrolls a student over HTTP. Superseded by the event channel.
    async fn enroll_student(
        &self,
        lecturer: &LecturerEmail,
        submission: &StudentSubmission,
    ) -> Result<Value, BackendError>;

    /// Marks attendance over HTTP. Superseded by the event channel.
    async fn mark_attendance(&self, submission: &StudentSubmission) -> Result<Value, BackendError>;

    /// Registers a lecturer with their courses.
    async fn create_lecturer(&self, lecturer: &NewLecturer) -> Result<Value, BackendError>;
}
