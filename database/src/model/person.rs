use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::consts::EntityId;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Person {
    pub id: EntityId,
    pub name: String,
    pub number: String,
}

/// The fields of a person that clients are allowed to write
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PersonFields {
    pub name: String,
    pub number: String,
}

#[derive(Error, Debug, PartialEq)]
#[error("Person validation failed: {}", describe_missing(.missing))]
pub struct ValidationError {
    pub missing: Vec<&'static str>,
}

fn describe_missing(missing: &[&'static str]) -> String {
    missing
        .iter()
        .map(|field| format!("{field}: Path `{field}` is required."))
        .collect::<Vec<_>>()
        .join(", ")
}

impl PersonFields {
    pub fn new(name: impl Into<String>, number: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            number: number.into(),
        }
    }

    /// Every stored person must have a non-empty name and number
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut missing = vec![];

        if self.name.is_empty() {
            missing.push("name");
        }

        if self.number.is_empty() {
            missing.push("number");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { missing })
        }
    }

    pub fn into_person(self, id: EntityId) -> Person {
        Person {
            id,
            name: self.name,
            number: self.number,
        }
    }
}

impl Person {
    pub fn new(name: impl Into<String>, number: impl Into<String>) -> Self {
        PersonFields::new(name, number).into_person(EntityId::new())
    }

    pub fn fields(&self) -> PersonFields {
        PersonFields::new(self.name.clone(), self.number.clone())
    }

    /// People the in-memory phonebook can start with
    pub fn sample_data() -> Vec<Person> {
        vec![
            Person::new("Arto Hellas", "040-123456"),
            Person::new("Ada Lovelace", "39-44-5323523"),
            Person::new("Dan Abramov", "12-43-234345"),
            Person::new("Mary Poppendieck", "39-23-6423122"),
        ]
    }

    pub fn new_test() -> Self {
        Person {
            id: EntityId("67e55044-10b1-426f-9247-bb680e5fe0c8".to_string()),
            name: "Ada Lovelace".to_string(),
            number: "39-44-5323523".to_string(),
        }
    }
}
