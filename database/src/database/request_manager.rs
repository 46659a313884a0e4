use std::{
    sync::{
        atomic::{AtomicU8, Ordering},
        Arc,
    },
    time::Duration,
};
use thiserror::Error;

use crate::{
    consts::consts::EntityId,
    model::{
        person::{Person, PersonFields},
        statement::{Statement, StatementResult},
    },
};

use super::table::table::ApplyErrors;

pub enum DatabaseRequestAction {
    Request(Statement),
    Shutdown,
}

#[derive(Debug, PartialEq)]
pub enum DatabaseResponseAction {
    Response(StatementResult),
    Rejected(ApplyErrors),
}

pub struct DatabaseRequest {
    pub response_sender: oneshot::Sender<DatabaseResponseAction>,
    pub action: DatabaseRequestAction,
    pub claim: RequestClaim,
}

const PENDING: u8 = 0;
const CLAIMED: u8 = 1;
const ABANDONED: u8 = 2;

/// Decides who owns the outcome of a request: either the database claims it before applying
/// it, or the caller abandons it after timing out. Whoever is first wins, the other backs off.
#[derive(Clone, Debug, Default)]
pub struct RequestClaim(Arc<AtomicU8>);

impl RequestClaim {
    /// Called by the database before applying a request, false when the caller has given up
    pub fn claim(&self) -> bool {
        self.transition(CLAIMED)
    }

    /// Called by a caller that timed out, false when the database is already applying the request
    pub fn abandon(&self) -> bool {
        self.transition(ABANDONED)
    }

    fn transition(&self, to: u8) -> bool {
        self.0
            .compare_exchange(PENDING, to, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

impl DatabaseRequestAction {
    pub fn log_format(&self) -> String {
        match self {
            DatabaseRequestAction::Request(statement) => statement.log_format(),
            DatabaseRequestAction::Shutdown => "Shutdown".to_string(),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum RequestManagerError {
    #[error("Database took too long to respond to request")]
    DatabaseTimeout,
    #[error("Database is not running")]
    DatabaseUnavailable,
    #[error("{0}")]
    Rejected(ApplyErrors),
    #[error("Database responded with an unexpected result for: {0}")]
    UnexpectedResult(&'static str),
}

/// Goal of the request manager is to provide a simple, type safe interface for interacting with the database
///
/// Every call sends a single statement to the database worker and waits for its response, at most
/// `timeout`. The request manager is cheap to clone, each clone shares the same worker.
#[derive(Clone)]
pub struct RequestManager {
    database_sender: flume::Sender<DatabaseRequest>,
    timeout: Duration,
}

impl RequestManager {
    pub fn new(database_sender: flume::Sender<DatabaseRequest>, timeout: Duration) -> Self {
        Self {
            database_sender,
            timeout,
        }
    }

    pub fn set_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn send_add(&self, person: Person) -> Result<Person, RequestManagerError> {
        self.send_single_statement(Statement::Add(person))
            .await?
            .single()
            .ok_or(RequestManagerError::UnexpectedResult("add"))
    }

    pub async fn send_replace(
        &self,
        id: EntityId,
        fields: PersonFields,
    ) -> Result<Option<Person>, RequestManagerError> {
        self.send_single_statement(Statement::Replace(id, fields))
            .await?
            .get_single()
            .ok_or(RequestManagerError::UnexpectedResult("replace"))
    }

    pub async fn send_remove(&self, id: EntityId) -> Result<String, RequestManagerError> {
        self.send_single_statement(Statement::Remove(id))
            .await?
            .success_status()
            .ok_or(RequestManagerError::UnexpectedResult("remove"))
    }

    pub async fn send_get(&self, id: EntityId) -> Result<Option<Person>, RequestManagerError> {
        self.send_single_statement(Statement::Get(id))
            .await?
            .get_single()
            .ok_or(RequestManagerError::UnexpectedResult("get"))
    }

    pub async fn send_list(&self) -> Result<Vec<Person>, RequestManagerError> {
        self.send_single_statement(Statement::List)
            .await?
            .list()
            .ok_or(RequestManagerError::UnexpectedResult("list"))
    }

    pub async fn send_count(&self) -> Result<usize, RequestManagerError> {
        self.send_single_statement(Statement::Count)
            .await?
            .count()
            .ok_or(RequestManagerError::UnexpectedResult("count"))
    }

    /// Sends a shutdown request to the database and returns the database's response
    pub async fn send_shutdown_request(&self) -> Result<String, RequestManagerError> {
        self.send_database_request(DatabaseRequestAction::Shutdown)
            .await?
            .success_status()
            .ok_or(RequestManagerError::UnexpectedResult("shutdown"))
    }

    /// Sends a single statement to the database and returns a single statement result
    pub async fn send_single_statement(
        &self,
        statement: Statement,
    ) -> Result<StatementResult, RequestManagerError> {
        self.send_database_request(DatabaseRequestAction::Request(statement))
            .await
    }

    async fn send_database_request(
        &self,
        database_request: DatabaseRequestAction,
    ) -> Result<StatementResult, RequestManagerError> {
        let (response_sender, mut response_receiver) =
            oneshot::channel::<DatabaseResponseAction>();
        let claim = RequestClaim::default();

        let request = DatabaseRequest {
            response_sender,
            action: database_request,
            claim: claim.clone(),
        };

        // Sends the request to the database worker, database will respond
        //  on the response_receiver once it's finished processing its request
        self.database_sender
            .send_async(request)
            .await
            .map_err(|_| RequestManagerError::DatabaseUnavailable)?;

        let response = match tokio::time::timeout(self.timeout, &mut response_receiver).await {
            Ok(response) => response,
            // Too late to give up, the request is being applied so its result has to be reported
            Err(_) if !claim.abandon() => response_receiver.await,
            Err(_) => return Err(RequestManagerError::DatabaseTimeout),
        };

        match response {
            Ok(DatabaseResponseAction::Response(result)) => Ok(result),
            Ok(DatabaseResponseAction::Rejected(err)) => Err(RequestManagerError::Rejected(err)),
            Err(oneshot::RecvError) => Err(RequestManagerError::DatabaseUnavailable),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_and_abandon_are_exclusive() {
        let claimed = RequestClaim::default();
        assert!(claimed.claim());
        assert!(!claimed.abandon());

        let abandoned = RequestClaim::default();
        assert!(abandoned.abandon());
        assert!(!abandoned.claim());
    }

    #[tokio::test]
    async fn claimed_request_outlives_timeout() {
        let (database_sender, database_receiver) = flume::unbounded::<DatabaseRequest>();

        let request_manager = RequestManager::new(database_sender, Duration::from_millis(10));

        tokio::spawn(async move {
            let request = database_receiver.recv_async().await.unwrap();
            assert!(request.claim.claim());

            // Slower than the caller's timeout
            tokio::time::sleep(Duration::from_millis(50)).await;

            let _ = request
                .response_sender
                .send(DatabaseResponseAction::Response(StatementResult::Count(3)));
        });

        assert_eq!(request_manager.send_count().await, Ok(3));
    }

    #[tokio::test]
    async fn stopped_database_is_unavailable() {
        let (database_sender, database_receiver) = flume::unbounded::<DatabaseRequest>();
        drop(database_receiver);

        let request_manager = RequestManager::new(database_sender, Duration::from_millis(50));

        assert_eq!(
            request_manager.send_count().await,
            Err(RequestManagerError::DatabaseUnavailable)
        );
    }

    #[tokio::test]
    async fn unanswered_request_times_out() {
        let (database_sender, database_receiver) = flume::unbounded::<DatabaseRequest>();

        let request_manager = RequestManager::new(database_sender, Duration::from_millis(50));

        assert_eq!(
            request_manager.send_list().await,
            Err(RequestManagerError::DatabaseTimeout)
        );

        // The receiver holds the unanswered request until the timeout has elapsed
        drop(database_receiver);
    }

    #[tokio::test]
    async fn mismatched_result_is_reported() {
        let (database_sender, database_receiver) = flume::unbounded::<DatabaseRequest>();

        let request_manager = RequestManager::new(database_sender, Duration::from_secs(1));

        tokio::spawn(async move {
            let request = database_receiver.recv_async().await.unwrap();
            let _ = request
                .response_sender
                .send(DatabaseResponseAction::Response(StatementResult::Count(1)));
        });

        assert_eq!(
            request_manager.send_list().await,
            Err(RequestManagerError::UnexpectedResult("list"))
        );
    }
}
