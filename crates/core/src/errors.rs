use thiserror::Error;

use crate::store::StoreError;

/// Failures the recommendation engine can surface to its caller.
///
/// Missing underlying data (no feedback, no sales history) is never an
/// error; those aggregates default to zero instead.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("not authorized: {0}")]
    NotAuthorized(String),
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EngineError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound { entity, id: id.into() }
    }
}
