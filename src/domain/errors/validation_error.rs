//! Input validation error types.

use thiserror::Error;

/// Form and identity validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum ValidationError {
    #[error("{field} is required")]
    EmptyField { field: &'static str },

    #[error("invalid email address: {value:?}")]
    InvalidEmail { value: String },

    #[error("at least one course is required")]
    NoCourses,

    #[error("no course selected")]
    NoCourseSelected,

    #[error("no form is open")]
    NoFormOpen,

    #[error("unknown course: {code}")]
    UnknownCourse { code: String },
}

impl ValidationError {
    /// Creates empty field error.
    #[must_use]
    pub const fn empty_field(field: &'static str) -> Self {
        Self::EmptyField { field }
    }

    /// Creates invalid email error.
    #[must_use]
    pub fn invalid_email(value: impl Into<String>) -> Self {
        Self::InvalidEmail {
            value: value.into(),
        }
    }

    /// Creates unknown course error.
    #[must_use]
    pub fn unknown_course(code: impl Into<String>) -> Self {
        Self::UnknownCourse { code: code.into() }
    }
}
