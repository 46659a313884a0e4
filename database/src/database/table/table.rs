use std::collections::HashMap;
use thiserror::Error;

use crate::{
    consts::consts::EntityId,
    model::{
        person::{Person, ValidationError},
        statement::{Statement, StatementResult},
    },
};

use super::row::PersonRow;

#[derive(Error, Debug, PartialEq)]
pub enum ApplyErrors {
    // CRUD - CREATE
    #[error("Cannot create, record already exists: {0}")]
    CannotCreateWhenAlreadyExists(EntityId),

    // Constraints
    #[error("{0}")]
    NotNullConstraintViolation(#[from] ValidationError),
}

pub struct PersonTable {
    pub person_rows: HashMap<EntityId, PersonRow>,
    next_position: usize,
}

impl PersonTable {
    pub fn new() -> Self {
        Self {
            person_rows: HashMap::new(),
            next_position: 0,
        }
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.person_rows.contains_key(id)
    }

    // Each mutation statement can be broken up into 2 steps
    //  - Verifying validity / constraints (non-empty fields)
    //  - Applying statement
    pub fn apply(&mut self, statement: Statement) -> Result<StatementResult, ApplyErrors> {
        let statement_result = match statement {
            Statement::Add(person) => {
                person.fields().validate()?;

                if self.contains(&person.id) {
                    return Err(ApplyErrors::CannotCreateWhenAlreadyExists(person.id));
                }

                self.person_rows.insert(
                    person.id.clone(),
                    PersonRow::new(person.clone(), self.next_position),
                );
                self.next_position += 1;

                StatementResult::Single(person)
            }
            Statement::Replace(id, fields) => {
                // Replacing a missing record is not an error, the caller decides what absent means.
                // Absence is reported before the fields are looked at.
                let Some(row) = self.person_rows.get_mut(&id) else {
                    return Ok(StatementResult::GetSingle(None));
                };

                fields.validate()?;

                StatementResult::GetSingle(Some(row.apply_replace(fields)))
            }
            Statement::Remove(id) => {
                let status = match self.person_rows.remove(&id) {
                    Some(_) => format!("Removed record [id: {}]", id),
                    None => format!("No record to remove [id: {}]", id),
                };

                StatementResult::SuccessStatus(status)
            }
            Statement::Get(id) => {
                StatementResult::GetSingle(self.person_rows.get(&id).map(|row| row.person.clone()))
            }
            Statement::List => {
                let mut rows: Vec<&PersonRow> = self.person_rows.values().collect();

                rows.sort_by_key(|row| row.position);

                StatementResult::List(rows.into_iter().map(|row| row.person.clone()).collect())
            }
            Statement::Count => StatementResult::Count(self.person_rows.len()),
        };

        Ok(statement_result)
    }
}

impl Default for PersonTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::person::PersonFields;

    fn table_with(people: &[Person]) -> PersonTable {
        let mut table = PersonTable::new();

        for person in people {
            table
                .apply(Statement::Add(person.clone()))
                .expect("should add");
        }

        table
    }

    mod add {
        use super::*;

        #[test]
        fn add_happy_path() {
            let mut table = PersonTable::new();
            let person = Person::new_test();

            let result = table.apply(Statement::Add(person.clone()));

            assert_eq!(result, Ok(StatementResult::Single(person)));
            assert_eq!(table.person_rows.len(), 1);
        }

        #[test]
        fn add_duplicate_id() {
            let person = Person::new_test();
            let mut table = table_with(&[person.clone()]);

            let result = table.apply(Statement::Add(person.clone()));

            assert_eq!(
                result,
                Err(ApplyErrors::CannotCreateWhenAlreadyExists(person.id))
            );
        }

        #[test]
        fn add_empty_number_is_rejected() {
            let mut table = PersonTable::new();

            let result = table.apply(Statement::Add(Person::new("Arto Hellas", "")));

            assert!(matches!(
                result,
                Err(ApplyErrors::NotNullConstraintViolation(_))
            ));
            assert_eq!(table.person_rows.len(), 0, "Nothing should be stored");
        }

        #[test]
        fn duplicate_names_are_allowed() {
            let mut table = table_with(&[Person::new("Arto Hellas", "040-123456")]);

            let result = table.apply(Statement::Add(Person::new("Arto Hellas", "040-654321")));

            assert!(result.is_ok());
        }
    }

    mod replace {
        use super::*;

        #[test]
        fn replace_keeps_id() {
            let person = Person::new_test();
            let mut table = table_with(&[person.clone()]);

            let result = table
                .apply(Statement::Replace(
                    person.id.clone(),
                    PersonFields::new("New", "000"),
                ))
                .unwrap();

            assert_eq!(
                result,
                StatementResult::GetSingle(Some(Person {
                    id: person.id,
                    name: "New".to_string(),
                    number: "000".to_string(),
                }))
            );
        }

        #[test]
        fn replace_missing_is_absent() {
            let mut table = PersonTable::new();

            let result = table
                .apply(Statement::Replace(
                    EntityId::new(),
                    PersonFields::new("New", "000"),
                ))
                .unwrap();

            assert_eq!(result, StatementResult::GetSingle(None));
            assert_eq!(table.person_rows.len(), 0);
        }

        #[test]
        fn replace_missing_with_empty_fields_is_absent() {
            let mut table = PersonTable::new();

            let result = table.apply(Statement::Replace(
                EntityId::new(),
                PersonFields::new("", ""),
            ));

            assert_eq!(result, Ok(StatementResult::GetSingle(None)));
        }

        #[test]
        fn replace_with_empty_name_leaves_row_untouched() {
            let person = Person::new_test();
            let mut table = table_with(&[person.clone()]);

            let result = table.apply(Statement::Replace(
                person.id.clone(),
                PersonFields::new("", "000"),
            ));

            assert!(result.is_err());
            assert_eq!(table.person_rows[&person.id].person, person);
        }
    }

    mod remove {
        use super::*;

        #[test]
        fn remove_is_idempotent() {
            let person = Person::new_test();
            let mut table = table_with(&[person.clone()]);

            assert!(table.apply(Statement::Remove(person.id.clone())).is_ok());
            assert!(table.apply(Statement::Remove(person.id.clone())).is_ok());
            assert_eq!(
                table.apply(Statement::Get(person.id)),
                Ok(StatementResult::GetSingle(None))
            );
        }
    }

    mod list {
        use super::*;

        #[test]
        fn list_in_insertion_order() {
            let people = Person::sample_data();
            let mut table = table_with(&people);

            assert_eq!(table.apply(Statement::List), Ok(StatementResult::List(people)));
        }

        #[test]
        fn count_matches_list() {
            let mut table = table_with(&Person::sample_data());

            let first = table.apply(Statement::List).unwrap().list().unwrap()[0]
                .id
                .clone();

            table.apply(Statement::Remove(first)).unwrap();

            let listed = table.apply(Statement::List).unwrap().list().unwrap();

            assert_eq!(
                table.apply(Statement::Count),
                Ok(StatementResult::Count(listed.len()))
            );
            assert_eq!(listed.len(), 3);
        }
    }
}
