//! Envelope wire format and tag-dispatched decoding.
//!
//! Every entity converts to an [`Envelope`]: a self-describing mapping with
//! a `tag`, an `internal_id` and a `fields` map whose values are scalars,
//! `null`, nested envelopes or sequences of those. Date/time fields are
//! mappings of integer `year`, `month`, `day`, `hour`, `minute`.
//!
//! Decoding goes through a [`TypeRegistry`] that maps tags to
//! reconstructors, so nested heterogeneous values (a task description
//! mixing text and assets, an optional asset owner) decode without the
//! caller naming concrete types.
//!
//! # Wire example
//!
//! ```json
//! {
//!   "tag": "asset",
//!   "internal_id": "a1",
//!   "fields": {
//!     "name": "Van",
//!     "description": "White delivery van",
//!     "owner": null,
//!     "tasks_assigned_to": []
//!   }
//! }
//! ```

pub mod datetime;
mod envelope;
mod registry;

pub use envelope::{Envelope, Fields};
pub use registry::{Decoder, LoadPolicy, Reconstructor, TypeRegistry};

pub(crate) use envelope::FieldReader;
