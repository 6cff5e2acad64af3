//! Integrity checks for loaded booking data.
//!
//! Live bookings enforce the no-overlap invariant at insertion time. Data
//! coming back from storage skips that path, so these checks re-establish
//! it on demand. Detects:
//! - Duplicate IDs
//! - Overlapping assignments on one resource
//! - Assignment sequences not sorted by start time
//! - Task participants busy with another task during the task
//!
//! All checks collect every problem instead of stopping at the first.

use std::collections::HashSet;
use std::sync::Arc;

use crate::models::{Asset, Identifiable, Person, Schedulable, Task};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities of one kind share the same ID.
    DuplicateId,
    /// Two assignments on one resource overlap.
    OverlappingAssignments,
    /// A resource's assignments are out of start-time order.
    UnsortedAssignments,
    /// A task participant holds another task during the task.
    BusyParticipant,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

fn finish(errors: Vec<ValidationError>) -> ValidationResult {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Checks one resource's assignment sequence.
///
/// # Checks
/// 1. Assignments are sorted ascending by start time
/// 2. No two assignments overlap
pub fn validate_schedulable(resource: &dyn Schedulable) -> ValidationResult {
    let mut errors = Vec::new();
    let assignments = resource.assignments();

    for pair in assignments.windows(2) {
        if pair[0].interval().start() > pair[1].interval().start() {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnsortedAssignments,
                format!(
                    "{} '{}': task '{}' listed after later task '{}'",
                    resource.tag(),
                    resource.internal_id(),
                    pair[1].task_id(),
                    pair[0].task_id()
                ),
            ));
        }
    }

    for (i, a) in assignments.iter().enumerate() {
        for b in &assignments[i + 1..] {
            if a.interval().overlaps(&b.interval()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::OverlappingAssignments,
                    format!(
                        "{} '{}': tasks '{}' {} and '{}' {} overlap",
                        resource.tag(),
                        resource.internal_id(),
                        a.task_id(),
                        a.interval(),
                        b.task_id(),
                        b.interval()
                    ),
                ));
            }
        }
    }

    finish(errors)
}

/// Checks that no participant of `task` is booked on another task during it.
pub fn validate_task(task: &Task) -> ValidationResult {
    let mut errors = Vec::new();
    let interval = task.interval();

    for participant in task.participants() {
        for other in participant.tasks_during(&interval) {
            if other.task_id() != task.internal_id() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::BusyParticipant,
                    format!(
                        "Task '{}': {} '{}' is busy with task '{}' {}",
                        task.internal_id(),
                        participant.tag(),
                        participant.internal_id(),
                        other.task_id(),
                        other.interval()
                    ),
                ));
            }
        }
    }

    finish(errors)
}

/// Validates a loaded roster of people and assets.
///
/// # Checks
/// 1. No duplicate person IDs
/// 2. No duplicate asset IDs
/// 3. Every assignment sequence passes [`validate_schedulable`]
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_roster(people: &[Arc<Person>], assets: &[Arc<Asset>]) -> ValidationResult {
    let mut errors = Vec::new();

    let mut person_ids = HashSet::new();
    for p in people {
        if !person_ids.insert(p.internal_id()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate person ID: {}", p.internal_id()),
            ));
        }
    }

    let mut asset_ids = HashSet::new();
    for a in assets {
        if !asset_ids.insert(a.internal_id()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate asset ID: {}", a.internal_id()),
            ));
        }
    }

    let resources = people
        .iter()
        .map(|p| p.as_ref() as &dyn Schedulable)
        .chain(assets.iter().map(|a| a.as_ref() as &dyn Schedulable));
    for resource in resources {
        if let Err(mut found) = validate_schedulable(resource) {
            errors.append(&mut found);
        }
    }

    finish(errors)
}
