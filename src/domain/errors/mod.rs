//! Domain error types.

mod action_error;
mod backend_error;
mod submit_error;
mod validation_error;

pub use action_error::ActionError;
pub use backend_error::BackendError;
pub use submit_error::SubmitError;
pub use validation_error::ValidationError;
