use crate::consts::consts::EntityId;

use super::person::{Person, PersonFields};

#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    Add(Person),
    Replace(EntityId, PersonFields),
    Remove(EntityId),
    Get(EntityId),
    /// Returns every person in insertion order
    List,
    Count,
}

impl Statement {
    pub fn is_mutation(&self) -> bool {
        match self {
            Statement::Add(_) | Statement::Remove(_) | Statement::Replace(_, _) => true,
            Statement::List | Statement::Count | Statement::Get(_) => false,
        }
    }

    pub fn log_format(&self) -> String {
        match self {
            Statement::Add(person) => format!("Add [id: {}]", person.id),
            Statement::Replace(id, _) => format!("Replace [id: {}]", id),
            Statement::Remove(id) => format!("Remove [id: {}]", id),
            Statement::Get(id) => format!("Get [id: {}]", id),
            Statement::List => "List".to_string(),
            Statement::Count => "Count".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum StatementResult {
    /// Used for database status messages
    SuccessStatus(String),
    Single(Person),
    GetSingle(Option<Person>),
    List(Vec<Person>),
    Count(usize),
}

impl StatementResult {
    pub fn single(self) -> Option<Person> {
        match self {
            StatementResult::Single(person) => Some(person),
            _ => None,
        }
    }

    pub fn get_single(self) -> Option<Option<Person>> {
        match self {
            StatementResult::GetSingle(person) => Some(person),
            _ => None,
        }
    }

    pub fn list(self) -> Option<Vec<Person>> {
        match self {
            StatementResult::List(people) => Some(people),
            _ => None,
        }
    }

    pub fn count(self) -> Option<usize> {
        match self {
            StatementResult::Count(count) => Some(count),
            _ => None,
        }
    }

    pub fn success_status(self) -> Option<String> {
        match self {
            StatementResult::SuccessStatus(status) => Some(status),
            _ => None,
        }
    }
}
