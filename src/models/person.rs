//! Person model.
//!
//! People are bookable resources that take part in tasks and may own
//! assets. Contact fields are opaque strings; no format checks apply.

use crate::codec::{Decoder, Envelope, FieldReader, Fields};
use crate::error::Result;

use super::agenda::{agenda_from_field, agenda_to_value, check_loaded};
use super::{Agenda, Codec, Identifiable, Schedulable};

/// A person who can be assigned to tasks.
#[derive(Debug)]
pub struct Person {
    internal_id: String,
    /// Display name.
    pub name: String,
    /// Contact e-mail.
    pub email: String,
    /// Contact phone number.
    pub phone_number: String,
    agenda: Agenda,
}

impl Person {
    /// Creates a person with no assignments.
    pub fn new(internal_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            internal_id: internal_id.into(),
            name: name.into(),
            email: String::new(),
            phone_number: String::new(),
            agenda: Agenda::new(),
        }
    }

    /// Sets the e-mail address.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    /// Sets the phone number.
    pub fn with_phone_number(mut self, phone_number: impl Into<String>) -> Self {
        self.phone_number = phone_number.into();
        self
    }
}

impl PartialEq for Person {
    fn eq(&self, other: &Self) -> bool {
        self.internal_id == other.internal_id
    }
}

impl Eq for Person {}

impl Identifiable for Person {
    fn tag(&self) -> &str {
        Self::TAG
    }

    fn internal_id(&self) -> &str {
        &self.internal_id
    }

    fn serialize(&self) -> Envelope {
        Envelope::new(Self::TAG, self.internal_id.as_str())
            .with_field("name", self.name.as_str())
            .with_field("email", self.email.as_str())
            .with_field("phone_number", self.phone_number.as_str())
            .with_field("tasks_assigned_to", agenda_to_value(&self.agenda))
    }
}

impl Schedulable for Person {
    fn agenda(&self) -> &Agenda {
        &self.agenda
    }
}

impl Codec for Person {
    const TAG: &'static str = "person";

    fn decode(internal_id: &str, fields: &Fields, decoder: &Decoder<'_>) -> Result<Self> {
        let reader = FieldReader::new(Self::TAG, fields);
        let person = Self {
            internal_id: internal_id.to_string(),
            name: reader.string("name")?,
            email: reader.string("email")?,
            phone_number: reader.string("phone_number")?,
            agenda: agenda_from_field(&reader, "tasks_assigned_to", decoder)?,
        };
        check_loaded(&person, decoder)?;
        Ok(person)
    }
}
