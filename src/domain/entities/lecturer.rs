//! Lecturer identity and registration.

use serde::{Deserialize, Serialize};

use super::course::CourseCode;
use crate::domain::errors::ValidationError;

/// Email address identifying the lecturer to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LecturerEmail(String);

impl LecturerEmail {
    /// Parses and validates an email address.
    ///
    /// # Errors
    /// Returns error if the value is not a plausible `local@domain` address.
    pub fn parse(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into().trim().to_string();

        let valid = match value.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.is_empty()
                    && !domain.contains('@')
                    && !value.contains(char::is_whitespace)
            }
            None => false,
        };

        if valid {
            Ok(Self(value))
        } else {
            Err(ValidationError::invalid_email(value))
        }
    }

    /// Returns the address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LecturerEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Course entered on the lecturer registration form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDraft {
    /// Course code.
    pub course_code: CourseCode,
    /// Course name.
    pub course_name: String,
}

impl CourseDraft {
    /// Creates a new course draft.
    #[must_use]
    pub fn new(course_code: impl Into<CourseCode>, course_name: impl Into<String>) -> Self {
        Self {
            course_code: course_code.into(),
            course_name: course_name.into().trim().to_string(),
        }
    }

    /// A row with neither code nor name is an unused form row.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.course_code.is_empty() && self.course_name.is_empty()
    }
}

/// Validated lecturer registration, serialized as the `POST /lecturers` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewLecturer {
    name: String,
    email: LecturerEmail,
    courses: Vec<CourseDraft>,
}

impl NewLecturer {
    /// Validates and builds a registration.
    ///
    /// Blank course rows are dropped. Half-filled rows are rejected.
    ///
    /// # Errors
    /// Returns error if the name is blank, a course row is incomplete,
    /// or no course remains.
    pub fn new(
        name: impl Into<String>,
        email: LecturerEmail,
        courses: Vec<CourseDraft>,
    ) -> Result<Self, ValidationError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::empty_field("name"));
        }

        let mut kept = Vec::with_capacity(courses.len());
        for course in courses {
            if course.is_blank() {
                continue;
            }
            if course.course_code.is_empty() {
                return Err(ValidationError::empty_field("courseCode"));
            }
            if course.course_name.is_empty() {
                return Err(ValidationError::empty_field("courseName"));
            }
            kept.push(course);
        }

        if kept.is_empty() {
            return Err(ValidationError::NoCourses);
        }

        Ok(Self {
            name,
            email,
            courses: kept,
        })
    }

    /// Returns the lecturer's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the lecturer's email.
    #[must_use]
    pub const fn email(&self) -> &LecturerEmail {
        &self.email
    }

    /// Returns the courses to register.
    #[must_use]
    pub fn courses(&self) -> &[CourseDraft] {
        &self.courses
    }
}
