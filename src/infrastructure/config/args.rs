use super::app_config::LogLevel;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "rollcall",
    version,
    about = "Lecturer client for a classroom attendance backend",
    long_about = None
)]
pub struct CliArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH", env = "ROLLCALL_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH", global = true)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum, env = "ROLLCALL_LOG_LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    /// Base URL of the HTTP API.
    #[arg(long, value_name = "URL", env = "ROLLCALL_BACKEND_URL", global = true)]
    pub backend_url: Option<String>,

    /// Base URL of the event channel.
    #[arg(long, value_name = "URL", env = "ROLLCALL_BACKEND_WS", global = true)]
    pub channel_url: Option<String>,

    /// Lecturer email.
    #[arg(long, value_name = "EMAIL", env = "ROLLCALL_LECTURER_EMAIL", global = true)]
    pub lecturer: Option<String>,

    /// Seconds to wait for an action's feedback event.
    #[arg(long, value_name = "SECS", global = true)]
    pub feedback_timeout_secs: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List the lecturer's courses.
    Courses,

    /// Enroll a student in a course.
    Enroll {
        #[command(flatten)]
        student: StudentArgs,

        /// Submit over HTTP instead of the event channel.
        #[arg(long)]
        legacy: bool,
    },

    /// Mark a student present in a course.
    Attend {
        #[command(flatten)]
        student: StudentArgs,

        /// Submit over HTTP instead of the event channel.
        #[arg(long)]
        legacy: bool,
    },

    /// List students enrolled in a course.
    Students {
        /// Course code.
        #[arg(long)]
        course: String,
    },

    /// Remove a student from a course.
    RemoveStudent {
        /// Course code.
        #[arg(long)]
        course: String,

        /// Student's matric number.
        #[arg(long)]
        matric_no: String,
    },

    /// Show attendance records of a course.
    Attendance {
        /// Course code.
        #[arg(long)]
        course: String,
    },

    /// Register a lecturer with the courses they teach.
    RegisterLecturer {
        /// Lecturer's name.
        #[arg(long)]
        name: String,

        /// Lecturer's email.
        #[arg(long)]
        email: String,

        /// Course as `CODE:Course name`. Repeat for more courses.
        #[arg(long = "course", value_name = "CODE:NAME", value_parser = parse_course_row)]
        courses: Vec<(String, String)>,

        /// Store the email as the configured lecturer.
        #[arg(long)]
        remember: bool,
    },
}

#[derive(Debug, Clone, clap::Args)]
pub struct StudentArgs {
    /// Course code.
    #[arg(long)]
    pub course: String,

    /// Student's name.
    #[arg(long)]
    pub name: String,

    /// Student's matric number.
    #[arg(long)]
    pub matric_no: String,
}

fn parse_course_row(raw: &str) -> Result<(String, String), String> {
    raw.split_once(':')
        .map(|(code, name)| (code.trim().to_string(), name.trim().to_string()))
        .ok_or_else(|| format!("expected CODE:NAME, got '{raw}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_enroll_command() {
        let args = CliArgs::try_parse_from([
            "rollcall",
            "enroll",
            "--course",
            "CS101",
            "--name",
            "Ada",
            "--matric-no",
            "M100",
        ])
        .unwrap();

        let Command::Enroll { student, legacy } = args.command else {
            panic!("expected enroll command");
        };
        assert_eq!(student.course, "CS101");
        assert_eq!(student.matric_no, "M100");
        assert!(!legacy);
    }

    #[test]
    fn test_parse_course_rows() {
        let args = CliArgs::try_parse_from([
            "rollcall",
            "register-lecturer",
            "--name",
            "Dr. O",
            "--email",
            "o@uni.edu",
            "--course",
            "CS101:Intro to Computing",
            "--course",
            "CS201: Data Structures",
        ])
        .unwrap();

        let Command::RegisterLecturer { courses, .. } = args.command else {
            panic!("expected register-lecturer command");
        };
        assert_eq!(
            courses,
            vec![
                ("CS101".to_string(), "Intro to Computing".to_string()),
                ("CS201".to_string(), "Data Structures".to_string()),
            ]
        );
    }

    #[test]
    fn test_course_row_needs_separator() {
        assert!(parse_course_row("CS101").is_err());
    }
}
