//! Request/feedback exchange over the event channel.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

use super::feedback_listeners::{FeedbackListeners, FeedbackSubscription};
use super::pending_actions::{ActionResult, PendingActions};
use crate::application::dto::EnrollPayload;
use crate::domain::entities::{
    ActionFeedback, ActionKind, Feedback, LecturerEmail, RequestId, StudentRemoval,
    StudentSubmission,
};
use crate::domain::errors::ActionError;
use crate::domain::ports::{ChannelEvent, EventChannelPort};
use crate::domain::ConnectionStatus;

/// Default bound on waiting for a feedback event.
pub const DEFAULT_FEEDBACK_TIMEOUT: Duration = Duration::from_secs(30);

const REQUEST_ID_FIELD: &str = "requestId";

/// An emitted action waiting for its feedback event.
#[must_use = "dropping a pending action discards its outcome"]
pub struct PendingAction {
    request_id: RequestId,
    kind: ActionKind,
    receiver: oneshot::Receiver<ActionResult>,
}

impl std::fmt::Debug for PendingAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingAction")
            .field("request_id", &self.request_id)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl PendingAction {
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    #[must_use]
    pub const fn kind(&self) -> ActionKind {
        self.kind
    }

    /// Waits for the feedback event or the timeout, whichever comes first.
    ///
    /// # Errors
    /// Returns `Rejected` if the feedback carried an error, `TimedOut` if none
    /// arrived in time, `Abandoned` if the bridge went away.
    pub async fn wait(self) -> Result<Feedback, ActionError> {
        self.receiver
            .await
            .unwrap_or(Err(ActionError::Abandoned { kind: self.kind }))
    }
}

/// Mediates enroll, attendance and delete exchanges on one event channel.
///
/// Payloads go out in the backend's shapes unchanged. With request tags
/// enabled each one also carries a `requestId`, which lets a backend that
/// echoes it route feedback to the exact action. Each feedback event resolves
/// exactly one pending action of its kind, by id when present and otherwise
/// the oldest, and is then handed to the listeners registered for that kind.
pub struct EventBridge {
    channel: Arc<dyn EventChannelPort>,
    pending: Arc<PendingActions>,
    listeners: Arc<FeedbackListeners>,
    feedback_timeout: Duration,
    tag_requests: bool,
}

impl EventBridge {
    #[must_use]
    pub fn new(channel: Arc<dyn EventChannelPort>, feedback_timeout: Duration) -> Self {
        Self {
            channel,
            pending: Arc::new(PendingActions::new()),
            listeners: Arc::new(FeedbackListeners::new()),
            feedback_timeout,
            tag_requests: false,
        }
    }

    /// Adds a `requestId` field to every emitted payload.
    #[must_use]
    pub const fn with_request_tags(mut self, enabled: bool) -> Self {
        self.tag_requests = enabled;
        self
    }

    /// Emits `enroll` with the submission and the lecturer's email.
    ///
    /// # Errors
    /// Returns error if the payload cannot be encoded or the channel refuses
    /// the emit.
    pub async fn enroll(
        &self,
        submission: &StudentSubmission,
        lecturer: &LecturerEmail,
    ) -> Result<PendingAction, ActionError> {
        let payload = EnrollPayload::new(submission, lecturer);
        self.emit_action(ActionKind::Enroll, &payload).await
    }

    /// Emits `attendance` with the submission.
    ///
    /// # Errors
    /// Returns error if the payload cannot be encoded or the channel refuses
    /// the emit.
    pub async fn mark_attendance(
        &self,
        submission: &StudentSubmission,
    ) -> Result<PendingAction, ActionError> {
        self.emit_action(ActionKind::Attendance, submission).await
    }

    /// Emits `delete_enrolled_students` for one student.
    ///
    /// # Errors
    /// Returns error if the payload cannot be encoded or the channel refuses
    /// the emit.
    pub async fn delete_enrolled_student(
        &self,
        removal: &StudentRemoval,
    ) -> Result<PendingAction, ActionError> {
        self.emit_action(ActionKind::DeleteEnrolledStudent, removal)
            .await
    }

    async fn emit_action<T: Serialize + ?Sized>(
        &self,
        kind: ActionKind,
        payload: &T,
    ) -> Result<PendingAction, ActionError> {
        let mut value = serde_json::to_value(payload).map_err(|e| ActionError::Serialization {
            kind,
            message: e.to_string(),
        })?;

        let (request_id, receiver) = self.pending.register(kind);

        if self.tag_requests
            && let Value::Object(fields) = &mut value
        {
            fields.insert(
                REQUEST_ID_FIELD.to_string(),
                Value::String(request_id.to_string()),
            );
        }

        if let Err(e) = self.channel.emit(kind.event_name(), value).await {
            error!(kind = %kind, error = %e, "Error emitting event");
            self.pending.cancel(request_id);
            return Err(e);
        }

        info!(kind = %kind, request_id = %request_id, "Event emitted");

        let pending = Arc::downgrade(&self.pending);
        let timeout = self.feedback_timeout;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            if let Some(pending) = pending.upgrade()
                && pending.expire(request_id, timeout)
            {
                warn!(
                    kind = %kind,
                    request_id = %request_id,
                    timeout_ms = timeout.as_millis(),
                    "No feedback received, clearing pending action"
                );
            }
        });
        self.pending.attach_timer(request_id, timer.abort_handle());

        Ok(PendingAction {
            request_id,
            kind,
            receiver,
        })
    }

    /// Registers a feedback listener for `kind`.
    pub fn subscribe(&self, kind: ActionKind) -> FeedbackSubscription {
        self.listeners.subscribe(kind)
    }

    /// Returns whether an action of `kind` is in flight.
    #[must_use]
    pub fn is_pending(&self, kind: ActionKind) -> bool {
        self.pending.is_pending(kind)
    }

    #[must_use]
    pub fn pending_count(&self, kind: ActionKind) -> usize {
        self.pending.pending_count(kind)
    }

    #[must_use]
    pub fn listener_count(&self, kind: ActionKind) -> usize {
        self.listeners.listener_count(kind)
    }

    #[must_use]
    pub fn connection_status(&self) -> ConnectionStatus {
        self.channel.status()
    }

    /// Handles an inbound channel event. Returns whether it was feedback.
    pub fn handle_event(&self, event: &str, payload: &Value) -> bool {
        let Some(kind) = ActionKind::from_feedback_event(event) else {
            trace!(event, "Ignoring non-feedback event");
            return false;
        };

        let feedback = Feedback::from_value(payload);
        debug!(kind = %kind, payload = %payload, "Feedback received");

        match self.pending.resolve(kind, &feedback) {
            Some(request_id) => trace!(kind = %kind, request_id = %request_id, "Feedback matched"),
            None => warn!(
                kind = %kind,
                request_id = ?feedback.request_id(),
                "Feedback matched no pending action"
            ),
        }

        if let Some(message) = feedback.error() {
            error!(kind = %kind, error = message, "Backend reported an error");
        } else {
            info!(kind = %kind, "Action succeeded");
        }

        let delivered = self.listeners.notify(&ActionFeedback { kind, feedback });
        trace!(kind = %kind, delivered, "Feedback delivered to listeners");

        true
    }

    /// Spawns a task feeding channel events into the bridge until the
    /// channel's event stream ends.
    pub fn spawn_pump(
        self: &Arc<Self>,
        mut events: mpsc::UnboundedReceiver<ChannelEvent>,
    ) -> JoinHandle<()> {
        let bridge = Arc::clone(self);

        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                match event {
                    ChannelEvent::Message { event, payload } => {
                        bridge.handle_event(&event, &payload);
                    }
                    ChannelEvent::Connected { session_id } => {
                        info!(session_id = %session_id, "Event channel connected");
                    }
                    ChannelEvent::Disconnected { reason } => {
                        warn!(reason = %reason, "Event channel disconnected");
                    }
                    ChannelEvent::Reconnecting { attempt } => {
                        info!(attempt, "Event channel reconnecting");
                    }
                    ChannelEvent::Error {
                        message,
                        recoverable,
                    } => {
                        error!(error = %message, recoverable, "Event channel error");
                    }
                }
            }
            debug!("Event channel stream ended");
        })
    }
}
