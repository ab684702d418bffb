//! Course entity.

use serde::{Deserialize, Serialize};

/// Course code as the backend stores it, e.g. `CS101` or `CS 101`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseCode(String);

impl CourseCode {
    /// Creates a course code, trimming surrounding whitespace.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_string())
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns whether the code is blank.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for CourseCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CourseCode {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for CourseCode {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// A course taught by the lecturer.
///
/// Courses are read-only on the client and the whole list is replaced on
/// every reload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(rename = "_id", default)]
    id: String,
    course_code: CourseCode,
    course_name: String,
}

impl Course {
    /// Creates a new course.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        course_code: impl Into<CourseCode>,
        course_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            course_code: course_code.into(),
            course_name: course_name.into(),
        }
    }

    /// Returns the backend identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
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
