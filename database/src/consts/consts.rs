use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// New Type Pattern -- https://doc.rust-lang.org/rust-by-example/generics/new_types.html
/// Storage generated identifier of a person. Always a lowercase, hyphenated UUID.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct EntityId(pub String);

#[derive(Error, Debug, PartialEq)]
#[error("malformatted id: {0}")]
pub struct InvalidEntityId(pub String);

impl EntityId {
    pub fn new() -> EntityId {
        EntityId(Uuid::new_v4().to_string())
    }

    /// Parses a client supplied identifier. Anything that is not a UUID is malformed,
    /// which is different from a well formed id that has no record.
    pub fn parse(id: &str) -> Result<EntityId, InvalidEntityId> {
        Uuid::parse_str(id)
            .map(|uuid| EntityId(uuid.hyphenated().to_string()))
            .map_err(|_| InvalidEntityId(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Values
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(2);
