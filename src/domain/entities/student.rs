//! Student entity.

use serde::{Deserialize, Serialize};

/// Matriculation number, the key students are enrolled and marked by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatricNo(String);

impl MatricNo {
    /// Creates a matric number, trimming surrounding whitespace.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_string())
    }

    /// Returns the matric number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns whether the matric number is blank.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for MatricNo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MatricNo {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for MatricNo {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// A student enrolled in a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    #[serde(rename = "_id", default)]
    id: String,
    name: String,
    matric_no: MatricNo,
}

impl Student {
    /// Creates a new student.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, matric_no: impl Into<MatricNo>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            matric_no: matric_no.into(),
        }
    }

    /// Returns the backend identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
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
}
