//! Student form submissions.

use serde::Serialize;

use super::course::{Course, CourseCode};
use super::student::MatricNo;

/// Form fields merged with the selected course.
///
/// Serializes to the body shared by enroll and attendance requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSubmission {
    name: String,
    matric_no: MatricNo,
    course_code: CourseCode,
    course_name: String,
}

impl StudentSubmission {
    /// Creates a submission for the given course.
    #[must_use]
    pub fn new(name: impl Into<String>, matric_no: impl Into<MatricNo>, course: &Course) -> Self {
        Self {
            name: name.into().trim().to_string(),
            matric_no: matric_no.into(),
            course_code: course.course_code().clone(),
            course_name: course.course_name().to_string(),
        }
    }

    /// Returns the student's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the matric number.
    #[must_use]
    pub const fn matric_no(&self) -> &MatricNo {
        &self.matric_no
    }

    /// Returns the course code.
    #[must_use]
    pub const fn course_code(&self) -> &CourseCode {
        &self.course_code
    }

    /// Returns the course name.
    #[must_use]
    pub fn course_name(&self) -> &str {
        &self.course_name
    }
}

/// Removal of one student from a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRemoval {
    /// Course to remove the student from.
    pub course_code: CourseCode,
    /// Student to remove.
    pub matric_no: MatricNo,
}

impl StudentRemoval {
    /// Creates a removal request.
    #[must_use]
    pub fn new(course_code: impl Into<CourseCode>, matric_no: impl Into<MatricNo>) -> Self {
        Self {
            course_code: course_code.into(),
            matric_no: matric_no.into(),
        }
    }
}
