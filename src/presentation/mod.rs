//! Presentation layer: views over the backend and the command-line front end.

/// Command runner.
pub mod cli;
/// Views holding per-screen state and feedback listeners.
pub mod views;

pub use cli::CommandRunner;
pub use views::{
    AttendanceRecordsView, DashboardView, EnrolledStudentsView, SubmissionMode, SubmitOutcome,
};
