//! Domain entity definitions.

mod action;
mod attendance;
mod course;
mod lecturer;
mod student;
mod submission;

pub use action::{ActionFeedback, ActionKind, Feedback, RequestId};
pub use attendance::AttendanceRecord;
pub use course::{Course, CourseCode};
pub use lecturer::{CourseDraft, LecturerEmail, NewLecturer};
pub use student::{MatricNo, Student};
pub use submission::{StudentRemoval, StudentSubmission};
