use crate::model::person::{Person, PersonFields};

/// A stored person and the order it was inserted in
#[derive(Clone, Debug, PartialEq)]
pub struct PersonRow {
    pub position: usize,
    pub person: Person,
}

impl PersonRow {
    pub fn new(person: Person, position: usize) -> Self {
        Self { position, person }
    }

    /// Overwrites every writable field, the id never changes
    pub fn apply_replace(&mut self, fields: PersonFields) -> Person {
        self.person = fields.into_person(self.person.id.clone());
        self.person.clone()
    }
}
