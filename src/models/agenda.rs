//! Schedulable capability: a per-resource assignment sequence.
//!
//! An [`Agenda`] keeps a resource's assignments sorted ascending by start
//! time behind its own write lock. Insertion is the only mutator and the
//! only place the no-overlap invariant is enforced.
//!
//! # Locking
//! A single-resource booking holds that resource's write lock across the
//! busy check and the insert. A multi-resource booking locks every
//! participant in `(tag, internal_id)` order before checking any of them,
//! so concurrent bookings over shared participants cannot deadlock.

use parking_lot::{RwLock, RwLockWriteGuard};
use tracing::{debug, trace};

use serde_json::Value;

use crate::codec::{datetime, Decoder, Envelope, FieldReader, Fields, LoadPolicy};
use crate::error::{Error, Result};
use crate::validation;

use super::{Codec, Identifiable, Task, TimeInterval};

/// A resource's reference to a task it is booked on.
///
/// Holds the task identity and interval only; the task itself is looked up
/// by id, never owned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    task_id: String,
    interval: TimeInterval,
}

impl Assignment {
    pub fn new(task_id: impl Into<String>, interval: TimeInterval) -> Self {
        Self {
            task_id: task_id.into(),
            interval,
        }
    }

    /// Assignment describing `task`.
    pub fn for_task(task: &Task) -> Self {
        Self::new(task.internal_id(), task.interval())
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn interval(&self) -> TimeInterval {
        self.interval
    }
}

impl Identifiable for Assignment {
    fn tag(&self) -> &str {
        Self::TAG
    }

    fn internal_id(&self) -> &str {
        &self.task_id
    }

    fn serialize(&self) -> Envelope {
        Envelope::new(Self::TAG, self.task_id.as_str())
            .with_field("start_time", datetime::to_fields(&self.interval.start()))
            .with_field("stop_time", datetime::to_fields(&self.interval.stop()))
    }
}

impl Codec for Assignment {
    const TAG: &'static str = "assignment";

    fn decode(internal_id: &str, fields: &Fields, _decoder: &Decoder<'_>) -> Result<Self> {
        let reader = FieldReader::new(Self::TAG, fields);
        Ok(Self::new(internal_id, reader.interval("start_time", "stop_time")?))
    }
}

/// Sorted, lock-protected assignment sequence owned by one resource.
#[derive(Debug, Default)]
pub struct Agenda {
    assignments: RwLock<Vec<Assignment>>,
}

impl Agenda {
    /// Creates an empty agenda.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an agenda from persisted assignments without overlap checks.
    ///
    /// The sequence is sorted by start time; overlaps are kept as given.
    pub fn from_assignments(mut assignments: Vec<Assignment>) -> Self {
        assignments.sort_by_key(|a| a.interval.start());
        Self {
            assignments: RwLock::new(assignments),
        }
    }

    /// Copy of the current sequence.
    pub fn snapshot(&self) -> Vec<Assignment> {
        self.assignments.read().clone()
    }

    pub fn len(&self) -> usize {
        self.assignments.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.read().is_empty()
    }

    /// Assignments overlapping `interval`, in start-time order.
    ///
    /// Recomputed on every call.
    pub fn tasks_during(&self, interval: &TimeInterval) -> Vec<Assignment> {
        self.assignments
            .read()
            .iter()
            .filter(|a| a.interval.overlaps(interval))
            .cloned()
            .collect()
    }

    pub fn is_busy(&self, interval: &TimeInterval) -> bool {
        self.assignments
            .read()
            .iter()
            .any(|a| a.interval.overlaps(interval))
    }

    /// Takes the write lock.
    pub(crate) fn lock(&self) -> AgendaGuard<'_> {
        AgendaGuard {
            assignments: self.assignments.write(),
        }
    }
}

/// Exclusive access to one agenda for the duration of a booking.
pub(crate) struct AgendaGuard<'a> {
    assignments: RwLockWriteGuard<'a, Vec<Assignment>>,
}

impl AgendaGuard<'_> {
    /// First held assignment that overlaps `assignment` or books the same task.
    ///
    /// Zero-length intervals overlap nothing, so the task id check is what
    /// keeps a degenerate task from being booked twice.
    pub(crate) fn conflict(&self, assignment: &Assignment) -> Option<&Assignment> {
        self.assignments.iter().find(|a| {
            a.task_id == assignment.task_id || a.interval.overlaps(&assignment.interval)
        })
    }

    /// Inserts at the start-time position, or returns the assignment in the way.
    pub(crate) fn insert(&mut self, assignment: Assignment) -> std::result::Result<(), Assignment> {
        if let Some(existing) = self.conflict(&assignment) {
            return Err(existing.clone());
        }
        let start = assignment.interval.start();
        let pos = self
            .assignments
            .partition_point(|a| a.interval.start() <= start);
        self.assignments.insert(pos, assignment);
        Ok(())
    }

    /// Removes a previously inserted assignment. Returns whether it was present.
    pub(crate) fn remove(&mut self, assignment: &Assignment) -> bool {
        match self.assignments.iter().rposition(|a| a == assignment) {
            Some(pos) => {
                self.assignments.remove(pos);
                true
            }
            None => false,
        }
    }
}

/// A resource that can be booked on tasks.
///
/// Implemented by entities that embed an [`Agenda`].
pub trait Schedulable: Identifiable {
    fn agenda(&self) -> &Agenda;

    /// Assigned tasks overlapping `interval`, ascending by start time.
    fn tasks_during(&self, interval: &TimeInterval) -> Vec<Assignment> {
        self.agenda().tasks_during(interval)
    }

    fn is_busy(&self, interval: &TimeInterval) -> bool {
        self.agenda().is_busy(interval)
    }

    fn is_free(&self, interval: &TimeInterval) -> bool {
        !self.is_busy(interval)
    }

    /// Snapshot of every assignment, ascending by start time.
    fn assignments(&self) -> Vec<Assignment> {
        self.agenda().snapshot()
    }

    /// Books this resource on `task`.
    ///
    /// # Errors
    /// `Error::SchedulingConflict` when the task's interval overlaps an
    /// existing assignment; the sequence is left unchanged.
    fn assign(&self, task: &Task) -> Result<()> {
        let assignment = Assignment::for_task(task);
        let mut guard = self.agenda().lock();
        match guard.insert(assignment) {
            Ok(()) => {
                debug!(
                    resource = self.internal_id(),
                    task = task.internal_id(),
                    "assignment accepted"
                );
                Ok(())
            }
            Err(existing) => {
                debug!(
                    resource = self.internal_id(),
                    task = task.internal_id(),
                    blocking = existing.task_id(),
                    "assignment rejected"
                );
                Err(Error::conflict(self.tag(), self.internal_id(), &existing))
            }
        }
    }
}

/// Books `assignment` on every participant, all or nothing.
///
/// Participants are deduplicated and locked in a fixed order, checked, then
/// committed. A failed commit rolls back the inserts already applied.
pub(crate) fn assign_all(participants: &[&dyn Schedulable], assignment: &Assignment) -> Result<()> {
    let mut ordered: Vec<&dyn Schedulable> = participants.to_vec();
    ordered.sort_by(|a, b| lock_key(*a).cmp(&lock_key(*b)));
    ordered.dedup_by(|a, b| std::ptr::eq(a.agenda(), b.agenda()));

    let mut guards: Vec<(&dyn Schedulable, AgendaGuard<'_>)> = ordered
        .iter()
        .map(|p| (*p, p.agenda().lock()))
        .collect();

    for (resource, guard) in &guards {
        if let Some(existing) = guard.conflict(assignment) {
            debug!(
                resource = resource.internal_id(),
                task = assignment.task_id(),
                blocking = existing.task_id(),
                "booking rejected"
            );
            return Err(Error::conflict(resource.tag(), resource.internal_id(), existing));
        }
    }

    for i in 0..guards.len() {
        let (applied, rest) = guards.split_at_mut(i);
        let (resource, guard) = &mut rest[0];
        if let Err(existing) = guard.insert(assignment.clone()) {
            for (_, done) in applied.iter_mut() {
                done.remove(assignment);
            }
            debug!(task = assignment.task_id(), "booking rolled back");
            return Err(Error::conflict(resource.tag(), resource.internal_id(), &existing));
        }
    }

    trace!(
        task = assignment.task_id(),
        participants = guards.len(),
        "booking committed"
    );
    Ok(())
}

/// Field value listing an agenda's assignments as envelopes.
pub(crate) fn agenda_to_value(agenda: &Agenda) -> Value {
    Value::Array(
        agenda
            .snapshot()
            .iter()
            .map(|a| a.serialize().into_value())
            .collect(),
    )
}

/// Reads an agenda back from `field` without re-checking overlaps.
pub(crate) fn agenda_from_field(
    reader: &FieldReader<'_>,
    field: &str,
    decoder: &Decoder<'_>,
) -> Result<Agenda> {
    let assignments = reader
        .array(field)?
        .iter()
        .map(|value| {
            decoder
                .decode_value(value)?
                .into_assignment()
                .ok_or_else(|| reader.malformed(field, "expected assignment envelopes"))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Agenda::from_assignments(assignments))
}

/// Applies the decoder's load policy to a freshly decoded resource.
pub(crate) fn check_loaded(resource: &dyn Schedulable, decoder: &Decoder<'_>) -> Result<()> {
    match decoder.load_policy() {
        LoadPolicy::Trusted => Ok(()),
        LoadPolicy::Validate => {
            validation::validate_schedulable(resource).map_err(Error::InvalidLoad)
        }
    }
}

fn lock_key<'a>(resource: &'a dyn Schedulable) -> (&'a str, &'a str, usize) {
    (
        resource.tag(),
        resource.internal_id(),
        resource.agenda() as *const Agenda as usize,
    )
}
