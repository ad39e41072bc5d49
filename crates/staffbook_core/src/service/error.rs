//! Service error type.

use crate::model::entity::EntityId;
use crate::model::validation::ValidationErrors;
use crate::repo::error::RepoError;
use thiserror::Error;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Target is missing or soft-deleted.
    #[error("{entity} with ID {id} not found.")]
    NotFound { entity: &'static str, id: EntityId },
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl ServiceError {
    pub fn not_found(entity: &'static str, id: EntityId) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
