//! Views over the backend, each owning its own listeners.

mod attendance_records;
mod dashboard;
mod enrolled_students;

pub use attendance_records::AttendanceRecordsView;
pub use dashboard::{DashboardView, SubmissionMode, SubmitOutcome};
pub use enrolled_students::EnrolledStudentsView;
