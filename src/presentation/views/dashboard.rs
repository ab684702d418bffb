//! Lecturer dashboard: course list and the enroll/attendance forms.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::application::services::{
    EventBridge, FeedbackSubscription, FormController, FormKind, PendingAction,
};
use crate::application::use_cases::{LegacySubmissionUseCase, LoadCoursesUseCase};
use crate::domain::entities::{ActionFeedback, ActionKind, Course, CourseCode, LecturerEmail};
use crate::domain::errors::{SubmitError, ValidationError};
use crate::domain::ports::BackendPort;

/// How the dashboard sends student forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionMode {
    /// Emit on the event channel and wait for a feedback event.
    #[default]
    Channel,
    /// POST to the HTTP endpoints. The response is the outcome.
    LegacyHttp,
}

/// Result of a successful submit.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Emitted on the channel; feedback is still outstanding.
    Emitted(PendingAction),
    /// Accepted over HTTP with the backend's response body.
    Recorded(Value),
}

/// Courses of the signed-in lecturer with the student forms.
pub struct DashboardView {
    lecturer: LecturerEmail,
    load_courses: LoadCoursesUseCase,
    legacy: LegacySubmissionUseCase,
    bridge: Arc<EventBridge>,
    mode: SubmissionMode,
    courses: Vec<Course>,
    load_error: Option<String>,
    form: FormController,
    enroll_feedback: FeedbackSubscription,
    attendance_feedback: FeedbackSubscription,
}

impl DashboardView {
    /// Registers the feedback listeners and loads the lecturer's courses.
    ///
    /// A failed fetch is logged and the view mounts with no courses.
    pub async fn mount(
        lecturer: LecturerEmail,
        backend: Arc<dyn BackendPort>,
        bridge: Arc<EventBridge>,
        mode: SubmissionMode,
    ) -> Self {
        let mut view = Self {
            lecturer,
            load_courses: LoadCoursesUseCase::new(backend.clone()),
            legacy: LegacySubmissionUseCase::new(backend),
            enroll_feedback: bridge.subscribe(ActionKind::Enroll),
            attendance_feedback: bridge.subscribe(ActionKind::Attendance),
            bridge,
            mode,
            courses: Vec::new(),
            load_error: None,
            form: FormController::new(),
        };

        view.reload().await;
        view
    }

    /// Fetches the course list again and replaces the current one.
    ///
    /// On failure the current list is kept.
    pub async fn reload(&mut self) {
        match self.load_courses.execute(&self.lecturer).await {
            Ok(courses) => {
                debug!(count = courses.len(), "Dashboard courses loaded");
                self.courses = courses;
                self.load_error = None;
            }
            Err(e) => {
                error!(lecturer = %self.lecturer, error = %e, "Error fetching courses");
                self.load_error = Some(e.to_string());
            }
        }
    }

    /// Courses from the last successful fetch.
    #[must_use]
    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    /// Message of the last failed course fetch, cleared by a successful one.
    #[must_use]
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// Lecturer the dashboard belongs to.
    #[must_use]
    pub const fn lecturer(&self) -> &LecturerEmail {
        &self.lecturer
    }

    /// How forms are sent.
    #[must_use]
    pub const fn mode(&self) -> SubmissionMode {
        self.mode
    }

    /// Looks up a loaded course by code.
    #[must_use]
    pub fn find_course(&self, code: &CourseCode) -> Option<&Course> {
        self.courses.iter().find(|c| c.course_code() == code)
    }

    /// Opens the enroll form for one of the loaded courses.
    ///
    /// # Errors
    /// Returns error if the lecturer has no course with this code.
    pub fn open_enroll(&mut self, code: &CourseCode) -> Result<(), ValidationError> {
        self.open(FormKind::Enroll, code)
    }

    /// Opens the attendance form for one of the loaded courses.
    ///
    /// # Errors
    /// Returns error if the lecturer has no course with this code.
    pub fn open_attendance(&mut self, code: &CourseCode) -> Result<(), ValidationError> {
        self.open(FormKind::Attendance, code)
    }

    fn open(&mut self, kind: FormKind, code: &CourseCode) -> Result<(), ValidationError> {
        if self.courses.is_empty() {
            return Err(ValidationError::NoCourses);
        }
        let course = self
            .find_course(code)
            .cloned()
            .ok_or_else(|| ValidationError::unknown_course(code.as_str()))?;

        debug!(form = ?kind, course = %code, "Form opened");
        self.form.open(kind, course);
        Ok(())
    }

    /// Form state.
    #[must_use]
    pub const fn form(&self) -> &FormController {
        &self.form
    }

    /// Form state, for typing into the fields.
    pub const fn form_mut(&mut self) -> &mut FormController {
        &mut self.form
    }

    /// Submits the open form.
    ///
    /// The form is reset as soon as the submission is built, before anything
    /// is sent.
    ///
    /// # Errors
    /// Returns error if the form is incomplete, the channel refuses the emit,
    /// or the HTTP request fails in legacy mode.
    pub async fn submit(&mut self) -> Result<SubmitOutcome, SubmitError> {
        let (kind, submission) = self.form.take_submission()?;

        let outcome = match (self.mode, kind) {
            (SubmissionMode::Channel, FormKind::Enroll) => self
                .bridge
                .enroll(&submission, &self.lecturer)
                .await
                .map(SubmitOutcome::Emitted)?,
            (SubmissionMode::Channel, FormKind::Attendance) => self
                .bridge
                .mark_attendance(&submission)
                .await
                .map(SubmitOutcome::Emitted)?,
            (SubmissionMode::LegacyHttp, FormKind::Enroll) => self
                .legacy
                .enroll(&self.lecturer, &submission)
                .await
                .map(SubmitOutcome::Recorded)?,
            (SubmissionMode::LegacyHttp, FormKind::Attendance) => self
                .legacy
                .mark_attendance(&submission)
                .await
                .map(SubmitOutcome::Recorded)?,
        };

        info!(
            form = ?kind,
            course = %submission.course_code(),
            matric_no = %submission.matric_no(),
            "Form submitted"
        );
        Ok(outcome)
    }

    /// Whether an enrollment waits for its feedback.
    #[must_use]
    pub fn is_enrolling(&self) -> bool {
        self.bridge.is_pending(ActionKind::Enroll)
    }

    /// Whether an attendance mark waits for its feedback.
    #[must_use]
    pub fn is_marking_attendance(&self) -> bool {
        self.bridge.is_pending(ActionKind::Attendance)
    }

    /// Drains the enroll and attendance feedback received so far.
    pub fn take_feedback(&mut self) -> Vec<ActionFeedback> {
        let mut received = Vec::new();
        for subscription in [&mut self.enroll_feedback, &mut self.attendance_feedback] {
            while let Some(feedback) = subscription.try_recv() {
                if let Some(message) = feedback.feedback.error() {
                    warn!(kind = %feedback.kind, error = message, "Feedback reported an error");
                }
                received.push(feedback);
            }
        }
        received
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use serde_json::json;

    use crate::domain::entities::{Feedback, RequestId};
    use crate::domain::errors::{ActionError, BackendError};
    use crate::domain::ports::mocks::{MockBackendPort, RecordingChannel};

    fn lecturer() -> LecturerEmail {
        LecturerEmail::parse("joelojerinde@gmail.com").unwrap()
    }

    fn intro() -> Course {
        Course::new("c1", "CS101", "Intro")
    }

    fn backend_with_courses(courses: Vec<Course>) -> MockBackendPort {
        let mut backend = MockBackendPort::new();
        backend
            .expect_fetch_courses()
            .returning(move |_| Ok(courses.clone()));
        backend
    }

    fn bridge(channel: Arc<RecordingChannel>) -> Arc<EventBridge> {
        Arc::new(EventBridge::new(channel, Duration::from_secs(30)))
    }

    async fn mounted(
        backend: MockBackendPort,
        channel: Arc<RecordingChannel>,
        mode: SubmissionMode,
    ) -> DashboardView {
        DashboardView::mount(lecturer(), Arc::new(backend), bridge(channel), mode).await
    }

    #[tokio::test]
    async fn test_mount_loads_courses() {
        let view = mounted(
            backend_with_courses(vec![intro()]),
            Arc::new(RecordingChannel::new()),
            SubmissionMode::Channel,
        )
        .await;

        assert_eq!(view.courses(), &[intro()]);
        assert!(view.load_error().is_none());
    }

    #[tokio::test]
    async fn test_failed_fetch_mounts_empty() {
        let mut backend = MockBackendPort::new();
        backend
            .expect_fetch_courses()
            .returning(|_| Err(BackendError::network("connection refused")));

        let view = mounted(backend, Arc::new(RecordingChannel::new()), SubmissionMode::Channel).await;

        assert!(view.courses().is_empty());
        assert_eq!(view.load_error(), Some("network error: connection refused"));
    }

    #[tokio::test]
    async fn test_reload_replaces_list() {
        let mut backend = MockBackendPort::new();
        let mut calls = 0;
        backend.expect_fetch_courses().times(2).returning(move |_| {
            calls += 1;
            if calls == 1 {
                Ok(vec![intro()])
            } else {
                Ok(vec![Course::new("c2", "CS201", "Data Structures")])
            }
        });

        let mut view = mounted(backend, Arc::new(RecordingChannel::new()), SubmissionMode::Channel).await;
        view.reload().await;

        assert_eq!(view.courses().len(), 1);
        assert_eq!(view.courses()[0].course_code().as_str(), "CS201");
    }

    #[tokio::test]
    async fn test_enroll_emits_form_merged_with_course() {
        let channel = Arc::new(RecordingChannel::new());
        let mut view = mounted(
            backend_with_courses(vec![intro()]),
            channel.clone(),
            SubmissionMode::Channel,
        )
        .await;

        view.open_enroll(&CourseCode::new("CS101")).unwrap();
        view.form_mut().set_name("Ada");
        view.form_mut().set_matric_no("M100");
        let outcome = view.submit().await.unwrap();

        assert!(matches!(outcome, SubmitOutcome::Emitted(_)));
        let (event, payload) = channel.last().unwrap();
        assert_eq!(event, "enroll");
        assert_eq!(
            payload,
            json!({
                "name": "Ada",
                "matricNo": "M100",
                "courseCode": "CS101",
                "courseName": "Intro",
                "lecturerEmail": "joelojerinde@gmail.com"
            })
        );
        assert!(view.is_enrolling());
        assert!(view.form().name().is_empty());
        assert!(view.form().open_form().is_none());
    }

    #[tokio::test]
    async fn test_enroll_feedback_clears_pending_once() {
        let channel = Arc::new(RecordingChannel::new());
        let backend = backend_with_courses(vec![intro()]);
        let bridge = bridge(channel);
        let mut view =
            DashboardView::mount(lecturer(), Arc::new(backend), bridge.clone(), SubmissionMode::Channel)
                .await;

        view.open_enroll(&CourseCode::new("CS101")).unwrap();
        view.form_mut().set_name("Ada");
        view.form_mut().set_matric_no("M100");
        view.submit().await.unwrap();
        assert!(view.is_enrolling());

        bridge.handle_event("enroll_feedback", &json!({"error": "Student already enrolled"}));

        assert!(!view.is_enrolling());
        let received = view.take_feedback();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].feedback.error(), Some("Student already enrolled"));
        assert!(view.take_feedback().is_empty());
    }

    #[tokio::test]
    async fn test_attendance_payload_has_no_lecturer() {
        let channel = Arc::new(RecordingChannel::new());
        let mut view = mounted(
            backend_with_courses(vec![intro()]),
            channel.clone(),
            SubmissionMode::Channel,
        )
        .await;

        view.open_attendance(&CourseCode::new("CS101")).unwrap();
        view.form_mut().set_name("Ada");
        view.form_mut().set_matric_no("M100");
        view.submit().await.unwrap();

        let (event, payload) = channel.last().unwrap();
        assert_eq!(event, "attendance");
        assert_eq!(
            payload,
            json!({"name": "Ada", "matricNo": "M100", "courseCode": "CS101", "courseName": "Intro"})
        );
        assert!(view.is_marking_attendance());
        assert!(!view.is_enrolling());
    }

    #[tokio::test]
    async fn test_failed_emit_clears_pending_and_resets_form() {
        let channel = Arc::new(RecordingChannel::new());
        channel.fail_with(ActionError::ChannelClosed);
        let mut view = mounted(
            backend_with_courses(vec![intro()]),
            channel,
            SubmissionMode::Channel,
        )
        .await;

        view.open_enroll(&CourseCode::new("CS101")).unwrap();
        view.form_mut().set_name("Ada");
        view.form_mut().set_matric_no("M100");
        let result = view.submit().await;

        assert!(matches!(result, Err(SubmitError::Action(ActionError::ChannelClosed))));
        assert!(!view.is_enrolling());
        assert!(view.form().open_form().is_none());
    }

    #[tokio::test]
    async fn test_legacy_mode_posts_over_http() {
        let mut backend = backend_with_courses(vec![intro()]);
        backend
            .expect_enroll_student()
            .withf(|lecturer, submission| {
                lecturer.as_str() == "joelojerinde@gmail.com"
                    && submission.matric_no().as_str() == "M100"
            })
            .times(1)
            .returning(|_, _| Ok(json!({"_id": "e1"})));
        let channel = Arc::new(RecordingChannel::new());
        let mut view = mounted(backend, channel.clone(), SubmissionMode::LegacyHttp).await;

        view.open_enroll(&CourseCode::new("CS101")).unwrap();
        view.form_mut().set_name("Ada");
        view.form_mut().set_matric_no("M100");
        let outcome = view.submit().await.unwrap();

        match outcome {
            SubmitOutcome::Recorded(body) => assert_eq!(body, json!({"_id": "e1"})),
            SubmitOutcome::Emitted(_) => panic!("expected an HTTP outcome"),
        }
        assert!(channel.emitted().is_empty());
        assert!(view.form().name().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_course_is_rejected() {
        let mut view = mounted(
            backend_with_courses(vec![intro()]),
            Arc::new(RecordingChannel::new()),
            SubmissionMode::Channel,
        )
        .await;

        assert_eq!(
            view.open_enroll(&CourseCode::new("CS999")),
            Err(ValidationError::unknown_course("CS999"))
        );
        assert!(view.form().open_form().is_none());
    }

    #[tokio::test]
    async fn test_open_without_courses() {
        let mut view = mounted(
            backend_with_courses(Vec::new()),
            Arc::new(RecordingChannel::new()),
            SubmissionMode::Channel,
        )
        .await;

        assert_eq!(
            view.open_attendance(&CourseCode::new("CS101")),
            Err(ValidationError::NoCourses)
        );
    }

    #[tokio::test]
    async fn test_feedback_for_known_request_id() {
        let channel = Arc::new(RecordingChannel::new());
        let bridge = bridge(channel);
        let mut view = DashboardView::mount(
            lecturer(),
            Arc::new(backend_with_courses(vec![intro()])),
            bridge.clone(),
            SubmissionMode::Channel,
        )
        .await;

        view.open_attendance(&CourseCode::new("CS101")).unwrap();
        view.form_mut().set_name("Ada");
        view.form_mut().set_matric_no("M100");
        let SubmitOutcome::Emitted(pending) = view.submit().await.unwrap() else {
            panic!("expected a channel outcome");
        };
        let request_id: RequestId = pending.request_id();

        bridge.handle_event(
            "attendance_feedback",
            &json!({"requestId": request_id.to_string()}),
        );

        assert_eq!(pending.wait().await, Ok(Feedback::success(Some(request_id))));
        assert!(!view.is_marking_attendance());
    }
}
