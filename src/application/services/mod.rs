//! Application services.

pub mod event_bridge;
pub mod feedback_listeners;
pub mod form_controller;
pub mod pending_actions;

pub use event_bridge::{DEFAULT_FEEDBACK_TIMEOUT, EventBridge, PendingAction};
pub use feedback_listeners::{FeedbackListeners, FeedbackSubscription};
pub use form_controller::{FormController, FormKind};
pub use pending_actions::{ActionResult, PendingActions};
