//! Errors surfaced by form submissions.

use thiserror::Error;

use super::{ActionError, BackendError, ValidationError};

/// Any failure of a submit flow.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Action(#[from] ActionError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}
