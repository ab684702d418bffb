use crate::domain::entities::{Course, MatricNo, StudentSubmission};
use crate::domain::errors::ValidationError;

/// Which submission flow the form is open for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Enroll,
    Attendance,
}

/// Two-field student form shared by the enroll and attendance flows.
#[derive(Debug, Default)]
pub struct FormController {
    name: String,
    matric_no: String,
    selected_course: Option<Course>,
    open_form: Option<FormKind>,
}

impl FormController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the course and opens the form for the given flow.
    pub fn open(&mut self, kind: FormKind, course: Course) {
        self.selected_course = Some(course);
        self.open_form = Some(kind);
    }

    /// Closes the form without touching the typed fields.
    pub fn close(&mut self) {
        self.open_form = None;
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_matric_no(&mut self, matric_no: impl Into<String>) {
        self.matric_no = matric_no.into();
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn matric_no(&self) -> &str {
        &self.matric_no
    }

    #[must_use]
    pub const fn selected_course(&self) -> Option<&Course> {
        self.selected_course.as_ref()
    }

    #[must_use]
    pub const fn open_form(&self) -> Option<FormKind> {
        self.open_form
    }

    /// Builds the submission and resets the form.
    ///
    /// The reset is optimistic: fields are cleared and the form closed before
    /// the backend has confirmed anything. The selected course is kept. On a
    /// validation error nothing changes.
    ///
    /// # Errors
    /// Returns error if no form is open, no course is selected or a field is
    /// blank.
    pub fn take_submission(&mut self) -> Result<(FormKind, StudentSubmission), ValidationError> {
        let kind = self.open_form.ok_or(ValidationError::NoFormOpen)?;
        let course = self
            .selected_course
            .as_ref()
            .ok_or(ValidationError::NoCourseSelected)?;

        if self.name.trim().is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        let matric_no = MatricNo::new(self.matric_no.as_str());
        if matric_no.is_empty() {
            return Err(ValidationError::empty_field("matricNo"));
        }

        let submission = StudentSubmission::new(self.name.as_str(), matric_no, course);

        self.name.clear();
        self.matric_no.clear();
        self.open_form = None;

        Ok((kind, submission))
    }
}
