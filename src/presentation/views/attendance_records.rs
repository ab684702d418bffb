//! Attendance history of one course.

use std::sync::Arc;

use tracing::{debug, error};

use crate::application::use_cases::CourseRosterUseCase;
use crate::domain::entities::{AttendanceRecord, CourseCode, MatricNo};
use crate::domain::ports::BackendPort;

/// Read-only list of the attendance sessions of a course.
pub struct AttendanceRecordsView {
    course_code: CourseCode,
    roster: CourseRosterUseCase,
    records: Vec<AttendanceRecord>,
    load_error: Option<String>,
}

impl AttendanceRecordsView {
    /// Loads the records. A failed fetch is logged and the view mounts empty.
    pub async fn mount(course_code: CourseCode, backend: Arc<dyn BackendPort>) -> Self {
        let mut view = Self {
            course_code,
            roster: CourseRosterUseCase::new(backend),
            records: Vec::new(),
            load_error: None,
        };

        view.reload().await;
        view
    }

    /// Fetches the records again. On failure the current list is kept.
    pub async fn reload(&mut self) {
        match self.roster.attendance_records(&self.course_code).await {
            Ok(records) => {
                debug!(course = %self.course_code, count = records.len(), "Attendance records loaded");
                self.records = records;
                self.load_error = None;
            }
            Err(e) => {
                error!(course = %self.course_code, error = %e, "Error fetching attendance records");
                self.load_error = Some(e.to_string());
            }
        }
    }

    /// Course shown by the view.
    #[must_use]
    pub const fn course_code(&self) -> &CourseCode {
        &self.course_code
    }

    /// Sessions in backend order.
    #[must_use]
    pub fn records(&self) -> &[AttendanceRecord] {
        &self.records
    }

    /// Message of the last failed fetch.
    #[must_use]
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// Number of sessions the student was present at.
    #[must_use]
    pub fn sessions_attended(&self, matric_no: &MatricNo) -> usize {
        self.records
            .iter()
            .filter(|record| record.is_present(matric_no))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Student;
    use crate::domain::errors::BackendError;
    use crate::domain::ports::mocks::MockBackendPort;

    fn records() -> Vec<AttendanceRecord> {
        vec![
            AttendanceRecord::new(
                "r1",
                "2024-03-11",
                vec![Student::new("s1", "Ada", "M100"), Student::new("s2", "Alan", "M101")],
            ),
            AttendanceRecord::new("r2", "2024-03-18", vec![Student::new("s1", "Ada", "M100")]),
        ]
    }

    #[tokio::test]
    async fn test_mount_loads_records() {
        let mut backend = MockBackendPort::new();
        backend
            .expect_fetch_attendance_records()
            .withf(|code| code.as_str() == "CS101")
            .times(1)
            .returning(|_| Ok(records()));

        let view = AttendanceRecordsView::mount(CourseCode::new("CS101"), Arc::new(backend)).await;

        assert_eq!(view.records().len(), 2);
        assert_eq!(view.sessions_attended(&MatricNo::new("M100")), 2);
        assert_eq!(view.sessions_attended(&MatricNo::new("M101")), 1);
        assert_eq!(view.sessions_attended(&MatricNo::new("M999")), 0);
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_records() {
        let mut backend = MockBackendPort::new();
        let mut calls = 0;
        backend
            .expect_fetch_attendance_records()
            .times(2)
            .returning(move |_| {
                calls += 1;
                if calls == 1 {
                    Ok(records())
                } else {
                    Err(BackendError::network("timed out"))
                }
            });

        let mut view =
            AttendanceRecordsView::mount(CourseCode::new("CS101"), Arc::new(backend)).await;
        view.reload().await;

        assert_eq!(view.records().len(), 2);
        assert_eq!(view.load_error(), Some("network error: timed out"));
    }
}
