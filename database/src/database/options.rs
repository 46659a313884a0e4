use std::time::Duration;

use crate::consts::consts::DEFAULT_REQUEST_TIMEOUT;

/// Where the phonebook keeps its people
#[derive(Debug, Clone, PartialEq)]
pub enum StorageEngine {
    /// Lives as long as the process, held by a dedicated database thread
    Memory,
    /// Postgres connection string, e.g. `host=localhost user=phonebook password=secret`
    Postgres(String),
}

#[derive(Debug, Clone)]
pub struct DatabaseOptions {
    pub storage_engine: StorageEngine,
    pub sample_data: bool,
    pub request_timeout: Duration,
}

// Implements: https://rust-unofficial.github.io/patterns/patterns/creational/builder.html
impl DatabaseOptions {
    pub fn set_storage_engine(mut self, storage_engine: StorageEngine) -> Self {
        self.storage_engine = storage_engine;
        self
    }

    /// Starts the in-memory engine with a handful of sample people. Ignored by Postgres.
    pub fn set_sample_data(mut self, sample_data: bool) -> Self {
        self.sample_data = sample_data;
        self
    }

    /// How long a caller waits on the in-memory database before giving up
    pub fn set_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            storage_engine: StorageEngine::Memory,
            sample_data: false,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

#[cfg(test)]
impl DatabaseOptions {
    pub fn new_test() -> Self {
        DatabaseOptions::default()
            .set_storage_engine(StorageEngine::Memory)
            .set_sample_data(false)
            .set_request_timeout(Duration::from_secs(1))
    }
}
