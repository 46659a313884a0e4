use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio_postgres::{error::SqlState, types::Json, Client, NoTls, Row};

use crate::{
    consts::consts::EntityId,
    model::person::{Person, PersonFields},
};

use super::{PersonStore, StoreError, StoreResult};

// Each person is stored as a `{name, number}` document keyed by its id, `seq` keeps insertion order
const CREATE_PERSONS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS "public"."persons" (
        "id" text NOT NULL,
        "data" jsonb NOT NULL,
        "seq" bigserial,
        PRIMARY KEY ("id"),
        CHECK (coalesce("data"->>'name', '') <> '' AND coalesce("data"->>'number', '') <> '')
    );
"#;

const SELECT_PERSONS: &str = r#"
    SELECT "id", "data" FROM "public"."persons" ORDER BY "seq";
"#;

const SELECT_PERSON: &str = r#"
    SELECT "id", "data" FROM "public"."persons" WHERE "id" = $1;
"#;

const INSERT_PERSON: &str = r#"
    INSERT INTO "public"."persons" ("id", "data") VALUES ($1, $2) ON CONFLICT ("id") DO NOTHING;
"#;

const UPDATE_PERSON: &str = r#"
    UPDATE "public"."persons" SET "data" = $2 WHERE "id" = $1 RETURNING "id", "data";
"#;

const DELETE_PERSON: &str = r#"
    DELETE FROM "public"."persons" WHERE "id" = $1;
"#;

const COUNT_PERSONS: &str = r#"
    SELECT COUNT(*) FROM "public"."persons";
"#;

/// Keeps people as jsonb documents in Postgres. One client is shared by the whole process.
pub struct PgStore {
    client: Client,
    connection: JoinHandle<()>,
}

impl PgStore {
    pub async fn connect(connection_string: &str) -> StoreResult<Self> {
        let (client, connection) = tokio_postgres::connect(connection_string, NoTls)
            .await
            .map_err(to_store_error)?;

        let connection = tokio::spawn(async move {
            if let Err(e) = connection.await {
                log::error!("Postgres connection error: {}", e);
            }
        });

        // DO baseline creates
        client
            .batch_execute(CREATE_PERSONS_TABLE)
            .await
            .map_err(to_store_error)?;

        log::info!("📀 Connected to postgres");

        Ok(Self { client, connection })
    }
}

#[async_trait]
impl PersonStore for PgStore {
    async fn list_all(&self) -> StoreResult<Vec<Person>> {
        self.client
            .query(SELECT_PERSONS, &[])
            .await
            .map_err(to_store_error)?
            .iter()
            .map(row_to_person)
            .collect()
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Person>> {
        let id = EntityId::parse(id)?;

        self.client
            .query_opt(SELECT_PERSON, &[&id.as_str()])
            .await
            .map_err(to_store_error)?
            .as_ref()
            .map(row_to_person)
            .transpose()
    }

    async fn create(&self, fields: PersonFields) -> StoreResult<Person> {
        fields.validate()?;

        loop {
            let id = EntityId::new();

            let inserted = self
                .client
                .execute(INSERT_PERSON, &[&id.as_str(), &Json(&fields)])
                .await
                .map_err(to_store_error)?;

            if inserted == 0 {
                log::warn!("Generated id already taken, retrying [id: {}]", id);
                continue;
            }

            log::info!("Added person [id: {}]", id);

            return Ok(fields.into_person(id));
        }
    }

    async fn replace(&self, id: &str, fields: PersonFields) -> StoreResult<Option<Person>> {
        let id = EntityId::parse(id)?;

        // An absent record takes precedence over invalid fields
        if let Err(err) = fields.validate() {
            return match self.find_by_id(id.as_str()).await? {
                Some(_) => Err(err.into()),
                None => Ok(None),
            };
        }

        self.client
            .query_opt(UPDATE_PERSON, &[&id.as_str(), &Json(&fields)])
            .await
            .map_err(to_store_error)?
            .as_ref()
            .map(row_to_person)
            .transpose()
    }

    async fn delete_by_id(&self, id: &str) -> StoreResult<()> {
        let id = EntityId::parse(id)?;

        let deleted = self
            .client
            .execute(DELETE_PERSON, &[&id.as_str()])
            .await
            .map_err(to_store_error)?;

        log::info!("Deleted {} person(s) [id: {}]", deleted, id);

        Ok(())
    }

    async fn count(&self) -> StoreResult<usize> {
        let count: i64 = self
            .client
            .query_one(COUNT_PERSONS, &[])
            .await
            .map_err(to_store_error)?
            .try_get(0)
            .map_err(|e| StoreError::Corrupted(e.to_string()))?;

        usize::try_from(count).map_err(|e| StoreError::Corrupted(e.to_string()))
    }

    async fn shutdown(&self) -> StoreResult<()> {
        self.connection.abort();
        log::info!("📀 Disconnected from postgres");

        Ok(())
    }
}

fn row_to_person(row: &Row) -> StoreResult<Person> {
    let id: String = row
        .try_get("id")
        .map_err(|e| StoreError::Corrupted(e.to_string()))?;

    let Json(fields): Json<PersonFields> = row
        .try_get("data")
        .map_err(|e| StoreError::Corrupted(format!("[id: {}] {}", id, e)))?;

    Ok(fields.into_person(EntityId(id)))
}

fn to_store_error(err: tokio_postgres::Error) -> StoreError {
    if err.is_closed() {
        return StoreError::StorageUnavailable(err.to_string());
    }

    match (err.code(), err.as_db_error()) {
        (Some(code), Some(db_error))
            if *code == SqlState::CHECK_VIOLATION || *code == SqlState::NOT_NULL_VIOLATION =>
        {
            StoreError::Validation(db_error.message().to_string())
        }
        (Some(_), _) => StoreError::Unexpected(err.to_string()),
        // No SQLSTATE means the server never answered, e.g. connecting or a dropped socket
        (None, _) => StoreError::StorageUnavailable(err.to_string()),
    }
}
