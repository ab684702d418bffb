//! Lecturer registration DTOs.

/// Raw lecturer registration form, before validation.
#[derive(Debug, Clone, Default)]
pub struct LecturerRegistration {
    /// Lecturer's name.
    pub name: String,
    /// Lecturer's email address.
    pub email: String,
    /// Course rows as `(courseCode, courseName)`.
    pub courses: Vec<(String, String)>,
}

impl LecturerRegistration {
    /// Creates a registration form with no course rows.
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            courses: Vec::new(),
        }
    }

    /// Adds a course row.
    #[must_use]
    pub fn with_course(mut self, code: impl Into<String>, name: impl Into<String>) -> Self {
        self.courses.push((code.into(), name.into()));
        self
    }
}
