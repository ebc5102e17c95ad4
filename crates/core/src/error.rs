use crate::types::DbId;

/// Boxed error raised by a [`PlayerStore`](crate::store::PlayerStore) backend.
///
/// The core never inspects or retries these; they are carried up to the
/// transport unchanged.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct StoreError(Box<dyn std::error::Error + Send + Sync + 'static>);

impl StoreError {
    pub fn new<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        Self(err.into())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {field} {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown filter kind: {0}")]
    InvalidFilterKind(String),

    #[error("Store failure: {0}")]
    Store(#[from] StoreError),
}

impl CoreError {
    /// Shorthand for a field-level [`CoreError::Validation`].
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }
}
