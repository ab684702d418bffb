use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::debug;

use crate::domain::entities::{ActionFeedback, ActionKind};

type ListenerId = u64;

#[derive(Default)]
struct ListenerTable {
    next_id: ListenerId,
    listeners: HashMap<ListenerId, (ActionKind, mpsc::UnboundedSender<ActionFeedback>)>,
}

/// Registry of views listening for feedback events.
///
/// Every registration gets its own id, so two listeners of the same kind each
/// receive one copy of every feedback event.
#[derive(Default)]
pub struct FeedbackListeners {
    table: Mutex<ListenerTable>,
}

impl FeedbackListeners {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener for `kind`. Dropping the subscription deregisters it.
    pub fn subscribe(self: &Arc<Self>, kind: ActionKind) -> FeedbackSubscription {
        let (sender, receiver) = mpsc::unbounded_channel();

        let id = {
            let mut table = self.table.lock();
            let id = table.next_id;
            table.next_id += 1;
            table.listeners.insert(id, (kind, sender));
            id
        };

        debug!(kind = %kind, listener = id, "Feedback listener registered");

        FeedbackSubscription {
            id,
            kind,
            receiver,
            registry: Arc::downgrade(self),
        }
    }

    /// Delivers feedback to every listener of its kind and returns how many
    /// received it.
    pub fn notify(&self, feedback: &ActionFeedback) -> usize {
        let mut table = self.table.lock();
        let mut delivered = 0;

        table.listeners.retain(|_, (kind, sender)| {
            if *kind != feedback.kind {
                return true;
            }
            if sender.send(feedback.clone()).is_ok() {
                delivered += 1;
                true
            } else {
                false
            }
        });

        delivered
    }

    #[must_use]
    pub fn listener_count(&self, kind: ActionKind) -> usize {
        self.table
            .lock()
            .listeners
            .values()
            .filter(|(k, _)| *k == kind)
            .count()
    }

    fn remove(&self, id: ListenerId) {
        self.table.lock().listeners.remove(&id);
    }
}

/// A registered feedback listener, held by a mounted view.
pub struct FeedbackSubscription {
    id: ListenerId,
    kind: ActionKind,
    receiver: mpsc::UnboundedReceiver<ActionFeedback>,
    registry: Weak<FeedbackListeners>,
}

impl FeedbackSubscription {
    #[must_use]
    pub const fn kind(&self) -> ActionKind {
        self.kind
    }

    /// Waits for the next feedback event. Returns `None` once the registry is gone.
    pub async fn recv(&mut self) -> Option<ActionFeedback> {
        self.receiver.recv().await
    }

    /// Returns the next already received feedback event, if any.
    pub fn try_recv(&mut self) -> Option<ActionFeedback> {
        self.receiver.try_recv().ok()
    }
}

impl Drop for FeedbackSubscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
            debug!(kind = %self.kind, listener = self.id, "Feedback listener removed");
        }
    }
}
