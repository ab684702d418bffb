//! Attendance record entity.

use serde::{Deserialize, Serialize};

use super::student::{MatricNo, Student};

/// Students marked present for one course session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    #[serde(rename = "_id", default)]
    id: String,
    date: String,
    #[serde(default)]
    students_present: Vec<Student>,
}

impl AttendanceRecord {
    /// Creates a new attendance record.
    #[must_use]
    pub fn new(id: impl Into<String>, date: impl Into<String>, students_present: Vec<Student>) -> Self {
        Self {
            id: id.into(),
            date: date.into(),
            students_present,
        }
    }

    /// Returns the backend identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Session date exactly as the backend sent it.
    #[must_use]
    pub fn date(&self) -> &str {
        &self.date
    }

    /// Students present, in the order they were marked.
    #[must_use]
    pub fn students_present(&self) -> &[Student] {
        &self.students_present
    }

    /// Returns the number of students present.
    #[must_use]
    pub fn headcount(&self) -> usize {
        self.students_present.len()
    }

    /// Returns whether the student was marked present in this session.
    #[must_use]
    pub fn is_present(&self, matric_no: &MatricNo) -> bool {
        self.students_present
            .iter()
            .any(|student| student.matric_no() == matric_no)
    }
}
