use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::{
    consts::consts::InvalidEntityId,
    database::{
        options::{DatabaseOptions, StorageEngine},
        request_manager::RequestManagerError,
        table::table::ApplyErrors,
    },
    model::person::{Person, PersonFields, ValidationError},
};

use self::{memory::MemoryStore, postgres::PgStore};

pub mod memory;
pub mod postgres;

#[derive(Error, Debug, PartialEq)]
pub enum StoreError {
    #[error("Malformed identifier: {0}")]
    InvalidIdentifier(String),

    #[error("{0}")]
    Validation(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Stored person could not be read: {0}")]
    Corrupted(String),

    #[error("Unexpected storage error: {0}")]
    Unexpected(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<InvalidEntityId> for StoreError {
    fn from(err: InvalidEntityId) -> Self {
        StoreError::InvalidIdentifier(err.0)
    }
}

impl From<ValidationError> for StoreError {
    fn from(err: ValidationError) -> Self {
        StoreError::Validation(err.to_string())
    }
}

impl From<RequestManagerError> for StoreError {
    fn from(err: RequestManagerError) -> Self {
        let message = err.to_string();

        match err {
            RequestManagerError::Rejected(ApplyErrors::NotNullConstraintViolation(validation)) => {
                validation.into()
            }
            RequestManagerError::Rejected(_) | RequestManagerError::UnexpectedResult(_) => {
                StoreError::Unexpected(message)
            }
            RequestManagerError::DatabaseTimeout | RequestManagerError::DatabaseUnavailable => {
                StoreError::StorageUnavailable(message)
            }
        }
    }
}

/// Durable collection of people, independent of the technology backing it.
///
/// Identifiers come straight from callers, so every method taking an `id` parses it first and
/// fails with [`StoreError::InvalidIdentifier`] when it is malformed. A well formed id without a
/// record is never an error.
#[async_trait]
pub trait PersonStore: Send + Sync {
    /// Every stored person, in insertion order
    async fn list_all(&self) -> StoreResult<Vec<Person>>;

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Person>>;

    /// Persists a new person under a freshly generated id
    async fn create(&self, fields: PersonFields) -> StoreResult<Person>;

    /// Overwrites name and number of an existing person, `None` when there is nobody to replace
    async fn replace(&self, id: &str, fields: PersonFields) -> StoreResult<Option<Person>>;

    /// Idempotent, deleting a missing person succeeds
    async fn delete_by_id(&self, id: &str) -> StoreResult<()>;

    async fn count(&self) -> StoreResult<usize>;

    /// Releases the backing resources, the store must not be used afterwards
    async fn shutdown(&self) -> StoreResult<()>;
}

/// Builds the store described by `options`. Shared by every binary so they agree on how
/// storage is configured.
pub async fn connect(options: DatabaseOptions) -> StoreResult<Arc<dyn PersonStore>> {
    let store: Arc<dyn PersonStore> = match options.storage_engine.clone() {
        StorageEngine::Memory => Arc::new(MemoryStore::start(options)?),
        StorageEngine::Postgres(connection_string) => {
            Arc::new(PgStore::connect(&connection_string).await?)
        }
    };

    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_validation_keeps_message() {
        let validation = ValidationError {
            missing: vec!["number"],
        };
        let message = validation.to_string();

        let store_error: StoreError = RequestManagerError::Rejected(
            ApplyErrors::NotNullConstraintViolation(validation),
        )
        .into();

        assert_eq!(store_error, StoreError::Validation(message));
    }

    #[test]
    fn timeout_is_unavailable() {
        let store_error: StoreError = RequestManagerError::DatabaseTimeout.into();

        assert!(matches!(store_error, StoreError::StorageUnavailable(_)));
    }

    #[tokio::test]
    async fn connect_memory_engine() {
        let store = connect(DatabaseOptions::new_test()).await.unwrap();

        assert_eq!(store.count().await, Ok(0));

        store.shutdown().await.unwrap();
    }
}
