//! Use case implementations.

mod course_roster_use_case;
mod legacy_submission_use_case;
mod load_courses_use_case;
mod register_lecturer_use_case;

pub use course_roster_use_case::CourseRosterUseCase;
pub use legacy_submission_use_case::LegacySubmissionUseCase;
pub use load_courses_use_case::LoadCoursesUseCase;
pub use register_lecturer_use_case::RegisterLecturerUseCase;
