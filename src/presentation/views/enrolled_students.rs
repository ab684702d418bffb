//! Students enrolled in one course.

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::application::services::{EventBridge, FeedbackSubscription, PendingAction};
use crate::application::use_cases::CourseRosterUseCase;
use crate::domain::entities::{
    ActionFeedback, ActionKind, CourseCode, MatricNo, RequestId, Student, StudentRemoval,
};
use crate::domain::errors::ActionError;
use crate::domain::ports::BackendPort;

/// Roster of a course with removal through the event channel.
///
/// Dropping the view deregisters its delete-feedback listener.
pub struct EnrolledStudentsView {
    course_code: CourseCode,
    roster: CourseRosterUseCase,
    bridge: Arc<EventBridge>,
    students: Vec<Student>,
    load_error: Option<String>,
    removals: VecDeque<(RequestId, MatricNo)>,
    delete_feedback: FeedbackSubscription,
}

impl EnrolledStudentsView {
    /// Registers the delete-feedback listener and loads the roster.
    pub async fn mount(
        course_code: CourseCode,
        backend: Arc<dyn BackendPort>,
        bridge: Arc<EventBridge>,
    ) -> Self {
        let mut view = Self {
            course_code,
            roster: CourseRosterUseCase::new(backend),
            delete_feedback: bridge.subscribe(ActionKind::DeleteEnrolledStudent),
            bridge,
            students: Vec::new(),
            load_error: None,
            removals: VecDeque::new(),
        };

        view.reload().await;
        view
    }

    /// Fetches the roster again. On failure the current list is kept.
    pub async fn reload(&mut self) {
        match self.roster.enrolled_students(&self.course_code).await {
            Ok(students) => {
                debug!(course = %self.course_code, count = students.len(), "Roster loaded");
                self.students = students;
                self.load_error = None;
            }
            Err(e) => {
                error!(course = %self.course_code, error = %e, "Error fetching enrolled students");
                self.load_error = Some(e.to_string());
            }
        }
    }

    /// Course shown by the view.
    #[must_use]
    pub const fn course_code(&self) -> &CourseCode {
        &self.course_code
    }

    /// Students from the last successful fetch.
    #[must_use]
    pub fn students(&self) -> &[Student] {
        &self.students
    }

    /// Message of the last failed fetch.
    #[must_use]
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// Whether a removal waits for its feedback.
    #[must_use]
    pub fn is_deleting(&self) -> bool {
        self.bridge.is_pending(ActionKind::DeleteEnrolledStudent)
    }

    /// Asks the backend to remove a student from this course.
    ///
    /// The student stays in the list until successful feedback arrives and
    /// is applied by [`Self::apply_feedback`].
    ///
    /// # Errors
    /// Returns error if the channel refuses the emit.
    pub async fn remove(&mut self, matric_no: MatricNo) -> Result<PendingAction, ActionError> {
        let removal = StudentRemoval::new(self.course_code.clone(), matric_no.clone());
        let pending = self.bridge.delete_enrolled_student(&removal).await?;

        self.removals.push_back((pending.request_id(), matric_no));
        Ok(pending)
    }

    /// Applies delete feedback received so far and returns it.
    ///
    /// Feedback naming a request id matches that removal; feedback without
    /// one matches the oldest. Students whose removal succeeded leave the
    /// list.
    pub fn apply_feedback(&mut self) -> Vec<ActionFeedback> {
        let mut received = Vec::new();
        while let Some(feedback) = self.delete_feedback.try_recv() {
            self.apply(&feedback);
            received.push(feedback);
        }
        received
    }

    /// Waits for the next delete feedback and applies it.
    ///
    /// Returns `None` once the bridge is gone.
    pub async fn next_feedback(&mut self) -> Option<ActionFeedback> {
        let feedback = self.delete_feedback.recv().await?;
        self.apply(&feedback);
        Some(feedback)
    }

    fn apply(&mut self, feedback: &ActionFeedback) {
        let position = match feedback.feedback.request_id() {
            Some(id) => self.removals.iter().position(|(r, _)| *r == id),
            None if self.removals.is_empty() => None,
            None => Some(0),
        };
        let Some((_, matric_no)) = position.and_then(|p| self.removals.remove(p)) else {
            debug!(course = %self.course_code, "Delete feedback for another view");
            return;
        };

        if let Some(message) = feedback.feedback.error() {
            warn!(matric_no = %matric_no, error = message, "Removal rejected");
            return;
        }

        self.students.retain(|s| s.matric_no() != &matric_no);
        info!(course = %self.course_code, matric_no = %matric_no, "Student removed");
    }
}
