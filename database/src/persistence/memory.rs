use async_trait::async_trait;

use crate::{
    consts::consts::EntityId,
    database::{
        database::Database,
        options::DatabaseOptions,
        request_manager::{RequestManager, RequestManagerError},
        table::table::ApplyErrors,
    },
    model::person::{Person, PersonFields},
};

use super::{PersonStore, StoreError, StoreResult};

/// Keeps people in a [`Database`] running on its own thread
pub struct MemoryStore {
    request_manager: RequestManager,
}

impl MemoryStore {
    pub fn start(options: DatabaseOptions) -> StoreResult<Self> {
        let request_manager = Database::new(options)
            .run()
            .map_err(|e| StoreError::StorageUnavailable(e.to_string()))?;

        Ok(Self { request_manager })
    }
}

#[async_trait]
impl PersonStore for MemoryStore {
    async fn list_all(&self) -> StoreResult<Vec<Person>> {
        Ok(self.request_manager.send_list().await?)
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Person>> {
        let id = EntityId::parse(id)?;

        Ok(self.request_manager.send_get(id).await?)
    }

    async fn create(&self, fields: PersonFields) -> StoreResult<Person> {
        loop {
            let person = fields.clone().into_person(EntityId::new());

            match self.request_manager.send_add(person).await {
                Err(RequestManagerError::Rejected(ApplyErrors::CannotCreateWhenAlreadyExists(
                    id,
                ))) => log::warn!("Generated id already taken, retrying [id: {}]", id),
                result => {
                    let person = result?;
                    log::info!("Added person [id: {}]", person.id);
                    return Ok(person);
                }
            }
        }
    }

    async fn replace(&self, id: &str, fields: PersonFields) -> StoreResult<Option<Person>> {
        let id = EntityId::parse(id)?;

        Ok(self.request_manager.send_replace(id, fields).await?)
    }

    async fn delete_by_id(&self, id: &str) -> StoreResult<()> {
        let id = EntityId::parse(id)?;

        let status = self.request_manager.send_remove(id).await?;
        log::info!("{}", status);

        Ok(())
    }

    async fn count(&self) -> StoreResult<usize> {
        Ok(self.request_manager.send_count().await?)
    }

    async fn shutdown(&self) -> StoreResult<()> {
        let status = self.request_manager.send_shutdown_request().await?;
        log::info!("{}", status);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn store() -> MemoryStore {
        MemoryStore::start(DatabaseOptions::new_test()).unwrap()
    }

    #[tokio::test]
    async fn create_then_find() {
        let store = store();

        let created = store
            .create(PersonFields::new("Ada Lovelace", "39-44-5323523"))
            .await
            .unwrap();

        let found = store.find_by_id(created.id.as_str()).await.unwrap();

        assert_eq!(found, Some(created));
    }

    #[tokio::test]
    async fn created_ids_are_unique() {
        let store = store();

        let first = store.create(PersonFields::new("A", "1")).await.unwrap();
        let second = store.create(PersonFields::new("A", "1")).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(store.count().await, Ok(2));
    }

    #[rstest]
    #[case("1")]
    #[case("abc")]
    #[case("67e55044-10b1-426f-9247")]
    #[tokio::test]
    async fn malformed_id_is_invalid_identifier(#[case] id: &str) {
        let store = store();

        assert_eq!(
            store.find_by_id(id).await,
            Err(StoreError::InvalidIdentifier(id.to_string()))
        );
        assert_eq!(
            store.replace(id, PersonFields::new("New", "000")).await,
            Err(StoreError::InvalidIdentifier(id.to_string()))
        );
        assert_eq!(
            store.delete_by_id(id).await,
            Err(StoreError::InvalidIdentifier(id.to_string()))
        );
    }

    #[tokio::test]
    async fn well_formed_missing_id_is_absent() {
        let store = store();
        let id = EntityId::new();

        assert_eq!(store.find_by_id(id.as_str()).await, Ok(None));
        assert_eq!(
            store
                .replace(id.as_str(), PersonFields::new("New", "000"))
                .await,
            Ok(None)
        );
    }

    #[tokio::test]
    async fn invalid_fields_are_validation_errors() {
        let store = store();

        let result = store.create(PersonFields::new("Ada Lovelace", "")).await;

        assert_eq!(
            result,
            Err(StoreError::Validation(
                "Person validation failed: number: Path `number` is required.".to_string()
            ))
        );
        assert_eq!(store.count().await, Ok(0));
    }

    #[tokio::test]
    async fn delete_twice() {
        let store = store();
        let created = store.create(PersonFields::new("A", "1")).await.unwrap();

        assert_eq!(store.delete_by_id(created.id.as_str()).await, Ok(()));
        assert_eq!(store.delete_by_id(created.id.as_str()).await, Ok(()));
        assert_eq!(store.count().await, Ok(0));
    }

    #[tokio::test]
    async fn calls_after_shutdown_are_unavailable() {
        let store = store();

        store.shutdown().await.unwrap();

        assert!(matches!(
            store.list_all().await,
            Err(StoreError::StorageUnavailable(_))
        ));
    }
}
