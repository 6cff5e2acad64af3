//! Task model.
//!
//! A task books a set of people and assets for one time interval. Its
//! description is a templated sentence mixing text and embedded assets,
//! e.g. `["Drive ", <Van>, " to the airport"]`; every embedded asset is a
//! participant.
//!
//! # Invariants
//! - Construction succeeds only if every participant is free for the whole
//!   interval, and then books all of them. A failure books none.
//! - Decoding never books anyone: participants arrive with their persisted
//!   assignments already in place.

use std::sync::Arc;

use serde_json::Value;

use crate::codec::{datetime, Decoder, Envelope, FieldReader, Fields, LoadPolicy};
use crate::error::{Error, Result};
use crate::validation;

use super::agenda::assign_all;
use super::{Asset, Assignment, Codec, Identifiable, Instant, Person, Schedulable, TimeInterval};

/// One element of a task description.
#[derive(Debug, Clone)]
pub enum Segment {
    /// Literal text.
    Text(String),
    /// An embedded asset reference.
    Asset(Arc<Asset>),
}

impl From<&str> for Segment {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Segment {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Arc<Asset>> for Segment {
    fn from(value: Arc<Asset>) -> Self {
        Self::Asset(value)
    }
}

/// A unit of work booked on people and assets for a time interval.
#[derive(Debug)]
pub struct Task {
    internal_id: String,
    interval: TimeInterval,
    actors: Vec<Arc<Person>>,
    description: Vec<Segment>,
}

impl Task {
    /// Creates a task and books it on every actor and every described asset.
    ///
    /// # Errors
    /// `Error::SchedulingConflict` naming the first busy participant. No
    /// participant's assignments change in that case.
    pub fn new(
        internal_id: impl Into<String>,
        interval: TimeInterval,
        actors: Vec<Arc<Person>>,
        description: Vec<Segment>,
    ) -> Result<Self> {
        let task = Self {
            internal_id: internal_id.into(),
            interval,
            actors,
            description,
        };
        assign_all(&task.participants(), &Assignment::for_task(&task))?;
        Ok(task)
    }

    pub fn interval(&self) -> TimeInterval {
        self.interval
    }

    pub fn start_time(&self) -> Instant {
        self.interval.start()
    }

    pub fn stop_time(&self) -> Instant {
        self.interval.stop()
    }

    pub fn actors(&self) -> &[Arc<Person>] {
        &self.actors
    }

    pub fn description(&self) -> &[Segment] {
        &self.description
    }

    /// Assets embedded in the description, in order of appearance.
    pub fn assets(&self) -> Vec<&Arc<Asset>> {
        self.description
            .iter()
            .filter_map(|segment| match segment {
                Segment::Asset(asset) => Some(asset),
                Segment::Text(_) => None,
            })
            .collect()
    }

    /// Actors followed by described assets.
    pub fn participants(&self) -> Vec<&dyn Schedulable> {
        let actors = self.actors.iter().map(|p| p.as_ref() as &dyn Schedulable);
        let assets = self
            .assets()
            .into_iter()
            .map(|a| a.as_ref() as &dyn Schedulable);
        actors.chain(assets).collect()
    }

    /// Renders the description with each asset replaced by its name.
    pub fn render(&self) -> String {
        self.description
            .iter()
            .map(|segment| match segment {
                Segment::Text(text) => text.as_str(),
                Segment::Asset(asset) => asset.name.as_str(),
            })
            .collect()
    }
}

impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.internal_id == other.internal_id
    }
}

impl Eq for Task {}

impl Identifiable for Task {
    fn tag(&self) -> &str {
        Self::TAG
    }

    fn internal_id(&self) -> &str {
        &self.internal_id
    }

    fn serialize(&self) -> Envelope {
        let actors: Vec<Value> = self
            .actors
            .iter()
            .map(|p| p.serialize().into_value())
            .collect();
        let description: Vec<Value> = self
            .description
            .iter()
            .map(|segment| match segment {
                Segment::Text(text) => Value::String(text.clone()),
                Segment::Asset(asset) => asset.serialize().into_value(),
            })
            .collect();
        Envelope::new(Self::TAG, self.internal_id.as_str())
            .with_field("start_time", datetime::to_fields(&self.interval.start()))
            .with_field("stop_time", datetime::to_fields(&self.interval.stop()))
            .with_field("actors", actors)
            .with_field("description", description)
    }
}

impl Codec for Task {
    const TAG: &'static str = "task";

    fn decode(internal_id: &str, fields: &Fields, decoder: &Decoder<'_>) -> Result<Self> {
        let reader = FieldReader::new(Self::TAG, fields);
        let interval = reader.interval("start_time", "stop_time")?;

        let actors = reader
            .array("actors")?
            .iter()
            .map(|value| {
                decoder
                    .decode_value(value)?
                    .into_person()
                    .ok_or_else(|| reader.malformed("actors", "expected person envelopes"))
            })
            .collect::<Result<Vec<_>>>()?;

        let description = reader
            .array("description")?
            .iter()
            .map(|value| match value {
                Value::String(text) => Ok(Segment::Text(text.clone())),
                Value::Object(_) => decoder
                    .decode_value(value)?
                    .into_asset()
                    .map(Segment::Asset)
                    .ok_or_else(|| reader.malformed("description", "expected asset envelopes")),
                _ => Err(reader.malformed("description", "expected text or asset envelopes")),
            })
            .collect::<Result<Vec<_>>>()?;

        let task = Self {
            internal_id: internal_id.to_string(),
            interval,
            actors,
            description,
        };
        if decoder.load_policy() == LoadPolicy::Validate {
            validation::validate_task(&task).map_err(Error::InvalidLoad)?;
        }
        Ok(task)
    }
}
