//! Resource booking core for the U-Engine ecosystem.
//!
//! Models people and assets that are booked onto time-bounded tasks, with
//! the invariant that no resource ever holds two overlapping assignments,
//! and a tag-dispatched codec that rebuilds typed entities from plain
//! nested mappings.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Person`, `Asset`, `Task`, `Assignment`,
//!   `Agenda`, `TimeInterval`, and the `Schedulable` capability
//! - **`codec`**: `Envelope` wire format, `TypeRegistry` dispatch, date/time fields
//! - **`validation`**: Integrity checks for loaded data (duplicate IDs, overlaps)
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use chrono::NaiveDate;
//! use u_logis::codec::TypeRegistry;
//! use u_logis::models::{Asset, Identifiable, Person, Schedulable, Task, TimeInterval};
//!
//! let day = NaiveDate::from_ymd_opt(2016, 1, 1).unwrap();
//! let slot = TimeInterval::new(
//!     day.and_hms_opt(9, 0, 0).unwrap(),
//!     day.and_hms_opt(10, 0, 0).unwrap(),
//! )
//! .unwrap();
//!
//! let steve = Arc::new(Person::new("p1", "Steve Winston"));
//! let van = Arc::new(Asset::new("a1", "Van").with_owner(Arc::clone(&steve)));
//! let task = Task::new(
//!     "t1",
//!     slot,
//!     vec![Arc::clone(&steve)],
//!     vec!["Drive ".into(), Arc::clone(&van).into(), " to the airport".into()],
//! )
//! .unwrap();
//! assert!(steve.is_busy(&slot));
//! assert_eq!(task.render(), "Drive Van to the airport");
//!
//! let registry = TypeRegistry::with_builtin_types();
//! let decoded = registry.decode(&task.serialize()).unwrap();
//! assert_eq!(decoded.internal_id(), "t1");
//! ```
//!
//! # Concurrency
//!
//! Every resource guards its own agenda with a write lock. Multi-resource
//! bookings lock participants in a fixed order, so entities can be shared
//! across threads behind `Arc`.

pub mod codec;
mod error;
pub mod models;
pub mod validation;

pub use error::{Error, Result};
