//! Booking domain models.
//!
//! Resources (people and assets) carry an agenda of assignments; tasks
//! book resources for a time interval. Every entity has an externally
//! assigned identity and converts to and from an envelope.
//!
//! # Domain Mappings
//!
//! | u-logis | Logistics | Facilities | Field service |
//! |---------|-----------|------------|---------------|
//! | Person | Driver | Staff member | Technician |
//! | Asset | Truck | Meeting room | Service van |
//! | Task | Delivery run | Booking | Work order |
//! | Assignment | Dispatch slot | Reservation | Appointment |

pub(crate) mod agenda;
mod asset;
mod entity;
mod interval;
mod person;
mod task;

pub use agenda::{Agenda, Assignment, Schedulable};
pub use asset::Asset;
pub use entity::{Codec, Entity, Identifiable};
pub use interval::{overlaps, Instant, TimeInterval};
pub use person::Person;
pub use task::{Segment, Task};
