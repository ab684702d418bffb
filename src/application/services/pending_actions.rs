use std::collections::VecDeque;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::task::AbortHandle;
use tracing::debug;

use crate::domain::entities::{ActionKind, Feedback, RequestId};
use crate::domain::errors::ActionError;

/// Outcome delivered to whoever waits on a pending action.
pub type ActionResult = Result<Feedback, ActionError>;

struct PendingEntry {
    request_id: RequestId,
    kind: ActionKind,
    emitted_at: Instant,
    responder: oneshot::Sender<ActionResult>,
    timer: Option<AbortHandle>,
}

impl PendingEntry {
    fn complete(self, result: ActionResult) {
        if let Some(timer) = self.timer {
            timer.abort();
        }
        let _ = self.responder.send(result);
    }
}

/// Actions emitted on the channel that still wait for their feedback event.
///
/// Entries are kept in emit order. Feedback naming a request id resolves that
/// entry; feedback without one resolves the oldest entry of its kind.
#[derive(Default)]
pub struct PendingActions {
    entries: Mutex<VecDeque<PendingEntry>>,
}

impl PendingActions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new in-flight action.
    pub fn register(&self, kind: ActionKind) -> (RequestId, oneshot::Receiver<ActionResult>) {
        let request_id = RequestId::generate();
        let (responder, receiver) = oneshot::channel();

        self.entries.lock().push_back(PendingEntry {
            request_id,
            kind,
            emitted_at: Instant::now(),
            responder,
            timer: None,
        });

        (request_id, receiver)
    }

    /// Attaches the expiry timer of an action. The timer is aborted right away
    /// if the action already completed.
    pub fn attach_timer(&self, request_id: RequestId, timer: AbortHandle) {
        let mut entries = self.entries.lock();
        if let Some(entry) = entries.iter_mut().find(|e| e.request_id == request_id) {
            entry.timer = Some(timer);
        } else {
            timer.abort();
        }
    }

    /// Resolves one pending action of `kind` with the received feedback.
    ///
    /// Returns the id of the resolved action, or `None` when nothing matched.
    pub fn resolve(&self, kind: ActionKind, feedback: &Feedback) -> Option<RequestId> {
        let entry = {
            let mut entries = self.entries.lock();
            let position = match feedback.request_id() {
                Some(id) => entries
                    .iter()
                    .position(|e| e.request_id == id && e.kind == kind),
                None => entries.iter().position(|e| e.kind == kind),
            }?;
            entries.remove(position)?
        };

        let request_id = entry.request_id;
        debug!(
            kind = %kind,
            request_id = %request_id,
            elapsed_ms = entry.emitted_at.elapsed().as_millis(),
            "Resolved pending action"
        );

        let result = match feedback.error() {
            Some(message) => Err(ActionError::rejected(kind, message)),
            None => Ok(feedback.clone()),
        };
        entry.complete(result);

        Some(request_id)
    }

    /// Fails the action with a timeout if it is still pending.
    pub fn expire(&self, request_id: RequestId, timeout: Duration) -> bool {
        let Some(entry) = self.take(request_id) else {
            return false;
        };

        let error = ActionError::TimedOut {
            kind: entry.kind,
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        };
        entry.complete(Err(error));
        true
    }

    /// Drops the action without notifying its waiter.
    pub fn cancel(&self, request_id: RequestId) -> bool {
        let Some(entry) = self.take(request_id) else {
            return false;
        };
        if let Some(timer) = entry.timer {
            timer.abort();
        }
        true
    }

    /// Returns whether any action of `kind` waits for feedback.
    #[must_use]
    pub fn is_pending(&self, kind: ActionKind) -> bool {
        self.entries.lock().iter().any(|e| e.kind == kind)
    }

    #[must_use]
    pub fn pending_count(&self, kind: ActionKind) -> usize {
        self.entries.lock().iter().filter(|e| e.kind == kind).count()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    fn take(&self, request_id: RequestId) -> Option<PendingEntry> {
        let mut entries = self.entries.lock();
        let position = entries.iter().position(|e| e.request_id == request_id)?;
        entries.remove(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feedback_with_id_resolves_that_action() {
        let pending = PendingActions::new();
        let (first, mut first_rx) = pending.register(ActionKind::Enroll);
        let (second, mut second_rx) = pending.register(ActionKind::Enroll);

        let resolved = pending.resolve(ActionKind::Enroll, &Feedback::success(Some(second)));

        assert_eq!(resolved, Some(second));
        assert!(second_rx.try_recv().unwrap().is_ok());
        assert!(first_rx.try_recv().is_err());
        assert_eq!(pending.pending_count(ActionKind::Enroll), 1);

        pending.resolve(ActionKind::Enroll, &Feedback::success(Some(first)));
        assert!(!pending.is_pending(ActionKind::Enroll));
    }

    #[test]
    fn test_feedback_without_id_resolves_oldest_of_kind() {
        let pending = PendingActions::new();
        let (enroll, _enroll_rx) = pending.register(ActionKind::Enroll);
        let (attendance, _attendance_rx) = pending.register(ActionKind::Attendance);
        let (later, _later_rx) = pending.register(ActionKind::Attendance);

        assert_eq!(
            pending.resolve(ActionKind::Attendance, &Feedback::default()),
            Some(attendance)
        );
        assert_eq!(
            pending.resolve(ActionKind::Attendance, &Feedback::default()),
            Some(later)
        );
        assert_eq!(pending.resolve(ActionKind::Attendance, &Feedback::default()), None);
        assert!(pending.is_pending(ActionKind::Enroll));
        assert_eq!(pending.len(), 1);
        assert!(pending.cancel(enroll));
        assert!(pending.is_empty());
    }

    #[test]
    fn test_each_feedback_clears_exactly_one() {
        let pending = PendingActions::new();
        let _a = pending.register(ActionKind::DeleteEnrolledStudent);
        let _b = pending.register(ActionKind::DeleteEnrolledStudent);

        pending.resolve(ActionKind::DeleteEnrolledStudent, &Feedback::default());
        assert_eq!(pending.pending_count(ActionKind::DeleteEnrolledStudent), 1);
        assert!(pending.is_pending(ActionKind::DeleteEnrolledStudent));

        pending.resolve(ActionKind::DeleteEnrolledStudent, &Feedback::default());
        assert!(!pending.is_pending(ActionKind::DeleteEnrolledStudent));
    }

    #[test]
    fn test_unknown_request_id_is_ignored() {
        let pending = PendingActions::new();
        let _kept = pending.register(ActionKind::Enroll);

        let stranger = Feedback::success(Some(RequestId::generate()));
        assert_eq!(pending.resolve(ActionKind::Enroll, &stranger), None);
        assert!(pending.is_pending(ActionKind::Enroll));
    }

    #[test]
    fn test_error_feedback_rejects_waiter() {
        let pending = PendingActions::new();
        let (id, mut rx) = pending.register(ActionKind::Enroll);

        pending.resolve(ActionKind::Enroll, &Feedback::failure(Some(id), "duplicate"));

        assert_eq!(
            rx.try_recv().unwrap(),
            Err(ActionError::rejected(ActionKind::Enroll, "duplicate"))
        );
    }

    #[test]
    fn test_expire_times_out_waiter_once() {
        let pending = PendingActions::new();
        let (id, mut rx) = pending.register(ActionKind::Attendance);

        assert!(pending.expire(id, Duration::from_secs(30)));
        assert!(!pending.expire(id, Duration::from_secs(30)));
        assert_eq!(
            rx.try_recv().unwrap(),
            Err(ActionError::TimedOut {
                kind: ActionKind::Attendance,
                timeout_ms: 30_000
            })
        );
        assert!(!pending.is_pending(ActionKind::Attendance));
    }

    #[test]
    fn test_feedback_for_other_kind_does_not_resolve() {
        let pending = PendingActions::new();
        let (id, _rx) = pending.register(ActionKind::Enroll);

        assert_eq!(
            pending.resolve(ActionKind::Attendance, &Feedback::success(Some(id))),
            None
        );
        assert!(pending.is_pending(ActionKind::Enroll));
    }
}
