//! Asset model.
//!
//! Assets are bookable things (vehicles, rooms, equipment). An asset may
//! name an owner; the owner is shared with the caller and is not part of the
//! asset's lifecycle.

use std::sync::Arc;

use serde_json::Value;

use crate::codec::{Decoder, Envelope, FieldReader, Fields};
use crate::error::Result;

use super::agenda::{agenda_from_field, agenda_to_value, check_loaded};
use super::{Agenda, Codec, Identifiable, Person, Schedulable};

/// A physical thing that can be assigned to tasks.
#[derive(Debug)]
pub struct Asset {
    internal_id: String,
    /// Display name, also used when rendering task descriptions.
    pub name: String,
    /// Free-form description.
    pub description: String,
    owner: Option<Arc<Person>>,
    agenda: Agenda,
}

impl Asset {
    /// Creates an unowned asset with no assignments.
    pub fn new(internal_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            internal_id: internal_id.into(),
            name: name.into(),
            description: String::new(),
            owner: None,
            agenda: Agenda::new(),
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the owner.
    pub fn with_owner(mut self, owner: Arc<Person>) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn owner(&self) -> Option<&Arc<Person>> {
        self.owner.as_ref()
    }
}

impl PartialEq for Asset {
    fn eq(&self, other: &Self) -> bool {
        self.internal_id == other.internal_id
    }
}

impl Eq for Asset {}

impl Identifiable for Asset {
    fn tag(&self) -> &str {
        Self::TAG
    }

    fn internal_id(&self) -> &str {
        &self.internal_id
    }

    fn serialize(&self) -> Envelope {
        let owner = self
            .owner
            .as_ref()
            .map_or(Value::Null, |p| p.serialize().into_value());
        Envelope::new(Self::TAG, self.internal_id.as_str())
            .with_field("name", self.name.as_str())
            .with_field("description", self.description.as_str())
            .with_field("owner", owner)
            .with_field("tasks_assigned_to", agenda_to_value(&self.agenda))
    }
}

impl Schedulable for Asset {
    fn agenda(&self) -> &Agenda {
        &self.agenda
    }
}

impl Codec for Asset {
    const TAG: &'static str = "asset";

    fn decode(internal_id: &str, fields: &Fields, decoder: &Decoder<'_>) -> Result<Self> {
        let reader = FieldReader::new(Self::TAG, fields);
        let owner = match reader.optional("owner") {
            None => None,
            Some(value) => Some(
                decoder
                    .decode_value(value)?
                    .into_person()
                    .ok_or_else(|| reader.malformed("owner", "expected a person envelope"))?,
            ),
        };
        let asset = Self {
            internal_id: internal_id.to_string(),
            name: reader.string("name")?,
            description: reader.string("description")?,
            owner,
            agenda: agenda_from_field(&reader, "tasks_assigned_to", decoder)?,
        };
        check_loaded(&asset, decoder)?;
        Ok(asset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::TypeRegistry;
    use crate::Error;
    use serde_json::json;

    #[test]
    fn test_unowned_asset_serialization() {
        let asset = Asset::new("a1", "Van").with_description("White delivery van");
        let value = serde_json::to_value(asset.serialize()).unwrap();
        assert_eq!(
            value,
            json!({
                "tag": "asset",
                "internal_id": "a1",
                "fields": {
                    "name": "Van",
                    "description": "White delivery van",
                    "owner": null,
                    "tasks_assigned_to": [],
                }
            })
        );
    }

    #[test]
    fn test_owner_round_trip() {
        let steve = Arc::new(Person::new("p1", "Steve Winston"));
        let asset = Asset::new("a1", "Van").with_owner(Arc::clone(&steve));
        let env = asset.serialize();
        assert_eq!(env.fields["owner"]["tag"], json!("person"));

        let registry = TypeRegistry::with_builtin_types();
        let decoded = registry.decode(&env).unwrap().into_asset().unwrap();
        assert_eq!(*decoded, asset);
        let owner = decoded.owner().unwrap();
        assert_eq!(owner.internal_id(), "p1");
        assert_eq!(owner.name, "Steve Winston");
    }

    #[test]
    fn test_owner_must_be_person() {
        let registry = TypeRegistry::with_builtin_types();
        let mut env = Asset::new("a1", "Van")
            .with_owner(Arc::new(Person::new("p1", "Steve")))
            .serialize();
        env.fields
            .insert("owner".into(), Asset::new("a2", "Trailer").serialize().into_value());

        let err = registry.decode(&env).unwrap_err();
        assert_eq!(
            err,
            Error::malformed("asset", "owner", "expected a person envelope")
        );
    }

    #[test]
    fn test_missing_owner_field_is_none() {
        let registry = TypeRegistry::with_builtin_types();
        let mut env = Asset::new("a1", "Van").serialize();
        env.fields.remove("owner");
        let decoded = registry.decode(&env).unwrap().into_asset().unwrap();
        assert!(decoded.owner().is_none());
    }
}
