use serde::Deserialize;

use crate::domain::entities::{AttendanceRecord, Course, Student};

/// `GET /courses/{lecturerEmail}` response.
#[derive(Debug, Deserialize)]
pub struct CoursesResponse {
    #[serde(default)]
    pub courses: Vec<Course>,
}

/// `GET /courses/enroll/{courseCode}` response.
#[derive(Debug, Deserialize)]
pub struct StudentsResponse {
    #[serde(default)]
    pub students: Vec<Student>,
}

/// `GET /courses/attendance/{courseCode}` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecordsResponse {
    #[serde(default)]
    pub attendance_records: Vec<AttendanceRecord>,
}

/// Error body. The backend uses either key.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub message: Option<String>,
    pub error: Option<String>,
}

impl ErrorResponse {
    pub fn into_message(self) -> Option<String> {
        self.message.or(self.error)
    }
}
