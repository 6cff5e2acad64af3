//! Envelope type and typed field access.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::models::{Instant, TimeInterval};

use super::datetime;

/// Field map carried by an envelope.
pub type Fields = Map<String, Value>;

/// Self-describing serialized form of an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Registry key of the concrete type.
    pub tag: String,
    /// Identity of the serialized entity.
    pub internal_id: String,
    /// Type-specific payload.
    #[serde(default)]
    pub fields: Fields,
}

impl Envelope {
    /// Creates an envelope with no fields.
    pub fn new(tag: impl Into<String>, internal_id: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            internal_id: internal_id.into(),
            fields: Fields::new(),
        }
    }

    /// Adds a field.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Converts into a plain mapping value for nesting or storage.
    pub fn into_value(self) -> Value {
        let mut map = Map::with_capacity(3);
        map.insert("tag".into(), Value::String(self.tag));
        map.insert("internal_id".into(), Value::String(self.internal_id));
        map.insert("fields".into(), Value::Object(self.fields));
        Value::Object(map)
    }

    /// Reads an envelope out of a mapping value.
    ///
    /// # Errors
    /// `Error::MalformedEnvelope` when `tag` or `internal_id` is missing or
    /// not a string, or `fields` is present but not a mapping.
    pub fn from_value(value: &Value) -> Result<Self> {
        let map = value
            .as_object()
            .ok_or_else(|| Error::malformed("?", "tag", "expected an envelope mapping"))?;
        let tag = map
            .get("tag")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::malformed("?", "tag", "missing or not a string"))?;
        let internal_id = map
            .get("internal_id")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::malformed(tag, "internal_id", "missing or not a string"))?;
        let fields = match map.get("fields") {
            None | Some(Value::Null) => Fields::new(),
            Some(Value::Object(fields)) => fields.clone(),
            Some(_) => return Err(Error::malformed(tag, "fields", "expected a mapping")),
        };
        Ok(Self {
            tag: tag.to_string(),
            internal_id: internal_id.to_string(),
            fields,
        })
    }
}

impl From<Envelope> for Value {
    fn from(value: Envelope) -> Self {
        value.into_value()
    }
}

/// Typed accessors over one envelope's fields.
///
/// Every failure becomes `Error::MalformedEnvelope` naming the tag and field.
pub(crate) struct FieldReader<'a> {
    tag: &'a str,
    fields: &'a Fields,
}

impl<'a> FieldReader<'a> {
    pub(crate) fn new(tag: &'a str, fields: &'a Fields) -> Self {
        Self { tag, fields }
    }

    pub(crate) fn malformed(&self, field: &str, reason: impl Into<String>) -> Error {
        Error::malformed(self.tag, field, reason)
    }

    pub(crate) fn required(&self, field: &str) -> Result<&'a Value> {
        self.fields
            .get(field)
            .ok_or_else(|| self.malformed(field, "missing"))
    }

    pub(crate) fn string(&self, field: &str) -> Result<String> {
        self.required(field)?
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| self.malformed(field, "expected a string"))
    }

    /// A field that may be absent or `null`.
    pub(crate) fn optional(&self, field: &str) -> Option<&'a Value> {
        self.fields.get(field).filter(|v| !v.is_null())
    }

    pub(crate) fn array(&self, field: &str) -> Result<&'a Vec<Value>> {
        self.required(field)?
            .as_array()
            .ok_or_else(|| self.malformed(field, "expected a sequence"))
    }

    pub(crate) fn instant(&self, field: &str) -> Result<Instant> {
        datetime::from_fields(self.required(field)?).map_err(|e| self.malformed(field, e.to_string()))
    }

    /// Reads a start/stop pair. A reversed pair is reported against `stop`.
    pub(crate) fn interval(&self, start: &str, stop: &str) -> Result<TimeInterval> {
        let (from, to) = (self.instant(start)?, self.instant(stop)?);
        TimeInterval::new(from, to).map_err(|e| self.malformed(stop, e.to_string()))
    }
}
