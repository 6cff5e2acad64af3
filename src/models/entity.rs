//! Identity and the decodable entity union.
//!
//! Identity is assigned externally and never changes after construction.
//! Equality between entities is identity-based: same tag and same
//! `internal_id` means the same entity.

use std::fmt;
use std::sync::Arc;

use crate::codec::{Decoder, Envelope, Fields};
use crate::error::Result;

use super::{Asset, Assignment, Person, Task};

/// An entity with a stable external identity and an envelope form.
pub trait Identifiable: fmt::Debug + Send + Sync {
    /// Registry tag of the concrete type.
    fn tag(&self) -> &str;

    /// Opaque identifier, fixed at construction.
    fn internal_id(&self) -> &str;

    /// Converts this entity into a tagged envelope, nested entities included.
    fn serialize(&self) -> Envelope;
}

/// Decoding half of the envelope contract.
///
/// Decoding rebuilds an entity directly from its fields. Whether the
/// rebuilt state is re-checked is decided by the decoder's `LoadPolicy`,
/// never by the entity's live constructor.
pub trait Codec: Identifiable + Sized {
    /// Tag under which the type registers itself.
    const TAG: &'static str;

    /// Reconstructs an entity from the fields of its envelope.
    fn decode(internal_id: &str, fields: &Fields, decoder: &Decoder<'_>) -> Result<Self>;
}

/// Any entity the registry can hand back.
///
/// Built-in variants have dedicated arms; types registered by callers
/// come back as `Custom`.
#[derive(Debug, Clone)]
pub enum Entity {
    Person(Arc<Person>),
    Asset(Arc<Asset>),
    Task(Arc<Task>),
    Assignment(Assignment),
    Custom(Arc<dyn Identifiable>),
}

impl Entity {
    fn inner(&self) -> &dyn Identifiable {
        match self {
            Self::Person(p) => p.as_ref(),
            Self::Asset(a) => a.as_ref(),
            Self::Task(t) => t.as_ref(),
            Self::Assignment(a) => a,
            Self::Custom(c) => c.as_ref(),
        }
    }

    pub fn tag(&self) -> &str {
        self.inner().tag()
    }

    pub fn internal_id(&self) -> &str {
        self.inner().internal_id()
    }

    pub fn serialize(&self) -> Envelope {
        self.inner().serialize()
    }

    pub fn as_person(&self) -> Option<&Arc<Person>> {
        match self {
            Self::Person(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_asset(&self) -> Option<&Arc<Asset>> {
        match self {
            Self::Asset(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_task(&self) -> Option<&Arc<Task>> {
        match self {
            Self::Task(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_assignment(&self) -> Option<&Assignment> {
        match self {
            Self::Assignment(a) => Some(a),
            _ => None,
        }
    }

    pub fn into_person(self) -> Option<Arc<Person>> {
        match self {
            Self::Person(p) => Some(p),
            _ => None,
        }
    }

    pub fn into_asset(self) -> Option<Arc<Asset>> {
        match self {
            Self::Asset(a) => Some(a),
            _ => None,
        }
    }

    pub fn into_task(self) -> Option<Arc<Task>> {
        match self {
            Self::Task(t) => Some(t),
            _ => None,
        }
    }

    pub fn into_assignment(self) -> Option<Assignment> {
        match self {
            Self::Assignment(a) => Some(a),
            _ => None,
        }
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.tag() == other.tag() && self.internal_id() == other.internal_id()
    }
}

impl Eq for Entity {}

impl From<Person> for Entity {
    fn from(value: Person) -> Self {
        Self::Person(Arc::new(value))
    }
}

impl From<Asset> for Entity {
    fn from(value: Asset) -> Self {
        Self::Asset(Arc::new(value))
    }
}

impl From<Task> for Entity {
    fn from(value: Task) -> Self {
        Self::Task(Arc::new(value))
    }
}

impl From<Assignment> for Entity {
    fn from(value: Assignment) -> Self {
        Self::Assignment(value)
    }
}
