//! Tag → reconstructor dispatch table.
//!
//! # Lifecycle
//! A registry is built once at startup (usually via
//! [`TypeRegistry::with_builtin_types`]) and then only read. It is a plain
//! value passed to decode calls, so independent registries can coexist.
//! Registration is append-only; a tag cannot be replaced or removed.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::models::{Asset, Assignment, Codec, Entity, Person, Task};

use super::{Envelope, Fields};

/// Builds an entity from an envelope's identity and fields.
///
/// Nested envelopes inside `fields` are resolved through the supplied
/// [`Decoder`].
pub type Reconstructor = Arc<dyn Fn(&str, &Fields, &Decoder<'_>) -> Result<Entity> + Send + Sync>;

/// Whether decoded state is re-checked before it is handed back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPolicy {
    /// Persisted state is accepted as-is; overlaps are not re-checked.
    #[default]
    Trusted,
    /// Decoded assignment sequences and task participants are validated.
    Validate,
}

/// Process-level mapping from type tag to reconstructor.
#[derive(Clone, Default)]
pub struct TypeRegistry {
    reconstructors: BTreeMap<String, Reconstructor>,
    load_policy: LoadPolicy,
}

impl TypeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with `person`, `asset`, `task` and `assignment`.
    pub fn with_builtin_types() -> Self {
        let mut registry = Self::new();
        registry.insert_codec::<Person>();
        registry.insert_codec::<Asset>();
        registry.insert_codec::<Task>();
        registry.insert_codec::<Assignment>();
        registry
    }

    /// Sets the load policy applied by decode calls.
    pub fn with_load_policy(mut self, policy: LoadPolicy) -> Self {
        self.load_policy = policy;
        self
    }

    pub fn load_policy(&self) -> LoadPolicy {
        self.load_policy
    }

    /// Registers a reconstructor under `tag`.
    ///
    /// # Errors
    /// `Error::DuplicateTag` if `tag` is taken; the existing entry is kept.
    pub fn register<F>(&mut self, tag: impl Into<String>, reconstructor: F) -> Result<()>
    where
        F: Fn(&str, &Fields, &Decoder<'_>) -> Result<Entity> + Send + Sync + 'static,
    {
        let tag = tag.into();
        if self.reconstructors.contains_key(tag.as_str()) {
            debug!(tag = tag.as_str(), "duplicate tag registration refused");
            return Err(Error::DuplicateTag { tag });
        }
        debug!(tag = tag.as_str(), "reconstructor registered");
        self.reconstructors.insert(tag, into_reconstructor(reconstructor));
        Ok(())
    }

    /// Registers a [`Codec`] type under its own tag.
    pub fn register_codec<T>(&mut self) -> Result<()>
    where
        T: Codec + Into<Entity> + 'static,
    {
        self.register(T::TAG, |id, fields, decoder| {
            T::decode(id, fields, decoder).map(Into::into)
        })
    }

    fn insert_codec<T>(&mut self)
    where
        T: Codec + Into<Entity> + 'static,
    {
        let reconstructor =
            into_reconstructor(|id, fields, decoder| T::decode(id, fields, decoder).map(Into::into));
        self.reconstructors.insert(T::TAG.to_string(), reconstructor);
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.reconstructors.contains_key(tag)
    }

    /// Returns sorted tags.
    pub fn tags(&self) -> Vec<&str> {
        self.reconstructors.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.reconstructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reconstructors.is_empty()
    }

    /// Decodes one envelope, nested envelopes included.
    ///
    /// # Errors
    /// - `Error::UnknownTag` if any tag in the tree is unregistered.
    /// - `Error::MalformedEnvelope` if a required field is absent or mistyped.
    ///
    /// No partial entity is returned on failure.
    pub fn decode(&self, envelope: &Envelope) -> Result<Entity> {
        Decoder::new(self).decode(envelope)
    }

    /// Decodes an envelope held as a plain mapping value.
    pub fn decode_value(&self, value: &Value) -> Result<Entity> {
        Decoder::new(self).decode_value(value)
    }
}

fn into_reconstructor<F>(f: F) -> Reconstructor
where
    F: Fn(&str, &Fields, &Decoder<'_>) -> Result<Entity> + Send + Sync + 'static,
{
    Arc::new(f)
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("tags", &self.tags())
            .field("load_policy", &self.load_policy)
            .finish()
    }
}

/// State for one decode call.
///
/// Entities are interned by `(tag, internal_id)`: the same identity
/// appearing twice in one tree decodes to one shared value. Every copy of
/// an identity must carry the fields of the first one; a differing copy is
/// rejected rather than dropped.
pub struct Decoder<'r> {
    registry: &'r TypeRegistry,
    seen: RefCell<HashMap<(String, String), (Fields, Entity)>>,
}

impl<'r> Decoder<'r> {
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self {
            registry,
            seen: RefCell::new(HashMap::new()),
        }
    }

    pub fn registry(&self) -> &'r TypeRegistry {
        self.registry
    }

    pub fn load_policy(&self) -> LoadPolicy {
        self.registry.load_policy
    }

    /// Dispatches `envelope` to the reconstructor registered for its tag.
    pub fn decode(&self, envelope: &Envelope) -> Result<Entity> {
        let key = (envelope.tag.clone(), envelope.internal_id.clone());
        if let Some((fields, entity)) = self.seen.borrow().get(&key) {
            if *fields != envelope.fields {
                debug!(
                    tag = envelope.tag.as_str(),
                    internal_id = envelope.internal_id.as_str(),
                    "conflicting copies of one identity"
                );
                return Err(Error::malformed(
                    &envelope.tag,
                    "internal_id",
                    format!(
                        "'{}' appears twice with different fields",
                        envelope.internal_id
                    ),
                ));
            }
            return Ok(entity.clone());
        }

        let reconstruct =
            self.registry
                .reconstructors
                .get(envelope.tag.as_str())
                .ok_or_else(|| Error::UnknownTag {
                    tag: envelope.tag.clone(),
                })?;
        trace!(
            tag = envelope.tag.as_str(),
            internal_id = envelope.internal_id.as_str(),
            "decoding envelope"
        );
        let entity = reconstruct(envelope.internal_id.as_str(), &envelope.fields, self)?;

        self.seen
            .borrow_mut()
            .insert(key, (envelope.fields.clone(), entity.clone()));
        Ok(entity)
    }

    pub fn decode_value(&self, value: &Value) -> Result<Entity> {
        self.decode(&Envelope::from_value(value)?)
    }
}
