//! Channel actions and their feedback.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Kind of action sent over the event channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Enroll a student in a course.
    Enroll,
    /// Mark a student present.
    Attendance,
    /// Remove a student from a course.
    DeleteEnrolledStudent,
}

impl ActionKind {
    /// All action kinds.
    pub const ALL: [Self; 3] = [Self::Enroll, Self::Attendance, Self::DeleteEnrolledStudent];

    /// Outbound event name.
    #[must_use]
    pub const fn event_name(self) -> &'static str {
        match self {
            Self::Enroll => "enroll",
            Self::Attendance => "attendance",
            Self::DeleteEnrolledStudent => "delete_enrolled_students",
        }
    }

    /// Inbound feedback event name.
    #[must_use]
    pub const fn feedback_event_name(self) -> &'static str {
        match self {
            Self::Enroll => "enroll_feedback",
            Self::Attendance => "attendance_feedback",
            Self::DeleteEnrolledStudent => "delete_enrolled_students_feedback",
        }
    }

    /// Maps a feedback event name back to its action.
    #[must_use]
    pub fn from_feedback_event(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.feedback_event_name() == name)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.event_name())
    }
}

/// Client-generated id tagging an emitted action and its feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Generates a random request id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RequestId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Payload of a feedback event: `{requestId?, error?}`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Feedback {
    request_id: Option<RequestId>,
    error: Option<String>,
}

impl Feedback {
    /// Feedback reporting success.
    #[must_use]
    pub const fn success(request_id: Option<RequestId>) -> Self {
        Self {
            request_id,
            error: None,
        }
    }

    /// Feedback reporting a failure.
    #[must_use]
    pub fn failure(request_id: Option<RequestId>, error: impl Into<String>) -> Self {
        Self {
            request_id,
            error: Some(error.into()),
        }
    }

    /// Reads feedback from an event payload.
    ///
    /// A payload that is not an object carries no error. A non-string
    /// `error` is kept as its JSON text. An unparseable `requestId` is
    /// treated as absent.
    #[must_use]
    pub fn from_value(payload: &Value) -> Self {
        let Some(object) = payload.as_object() else {
            return Self::default();
        };

        let request_id = object
            .get("requestId")
            .and_then(Value::as_str)
            .and_then(|id| id.parse().ok());

        let error = match object.get("error") {
            None | Some(Value::Null) => None,
            Some(Value::String(message)) => Some(message.clone()),
            Some(other) => Some(other.to_string()),
        };

        Self { request_id, error }
    }

    /// Returns the echoed request id.
    #[must_use]
    pub const fn request_id(&self) -> Option<RequestId> {
        self.request_id
    }

    /// Returns the error reported by the backend.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Returns whether the feedback reports success.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Feedback delivered to a listener, tagged with its action kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionFeedback {
    /// Action the feedback belongs to.
    pub kind: ActionKind,
    /// Feedback payload.
    pub feedback: Feedback,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test_case("enroll_feedback", Some(ActionKind::Enroll))]
    #[test_case("attendance_feedback", Some(ActionKind::Attendance))]
    #[test_case("delete_enrolled_students_feedback", Some(ActionKind::DeleteEnrolledStudent))]
    #[test_case("enroll", None)]
    #[test_case("unknown", None)]
    fn test_feedback_event_mapping(name: &str, expected: Option<ActionKind>) {
        assert_eq!(ActionKind::from_feedback_event(name), expected);
    }

    #[test]
    fn test_feedback_empty_object_is_success() {
        let feedback = Feedback::from_value(&json!({}));
        assert!(feedback.is_success());
        assert!(feedback.request_id().is_none());
    }

    #[test]
    fn test_feedback_reads_error_and_request_id() {
        let id = RequestId::generate();
        let feedback = Feedback::from_value(&json!({
            "requestId": id.to_string(),
            "error": "Student already enrolled"
        }));

        assert_eq!(feedback.request_id(), Some(id));
        assert_eq!(feedback.error(), Some("Student already enrolled"));
    }

    #[test]
    fn test_feedback_non_string_error() {
        let feedback = Feedback::from_value(&json!({"error": {"code": 11000}}));
        assert_eq!(feedback.error(), Some(r#"{"code":11000}"#));
    }

    #[test]
    fn test_feedback_null_error_and_bad_id() {
        let feedback = Feedback::from_value(&json!({"error": null, "requestId": "nope"}));
        assert!(feedback.is_success());
        assert!(feedback.request_id().is_none());
    }

    #[test]
    fn test_feedback_non_object_payload() {
        assert!(Feedback::from_value(&json!("done")).is_success());
    }
}
