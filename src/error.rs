//! Error types.
//!
//! Every fallible operation in the crate returns [`Error`]. Errors are
//! reported to the immediate caller; nothing is retried or swallowed.

use chrono::NaiveDateTime;

use crate::models::{Assignment, TimeInterval};
use crate::validation::ValidationError;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the registry, the codec and the booking operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// A reconstructor is already registered under this tag.
    #[error("type tag already registered: {tag}")]
    DuplicateTag { tag: String },

    /// No reconstructor is registered for the envelope's tag.
    #[error("no reconstructor registered for tag: {tag}")]
    UnknownTag { tag: String },

    /// A required field is absent or has the wrong shape.
    #[error("malformed `{tag}` envelope, field `{field}`: {reason}")]
    MalformedEnvelope {
        tag: String,
        field: String,
        reason: String,
    },

    /// The resource already holds an assignment overlapping the request.
    #[error(
        "{resource_tag} '{resource_id}' is already assigned to task '{task_id}' during {interval}"
    )]
    SchedulingConflict {
        resource_tag: String,
        resource_id: String,
        task_id: String,
        interval: TimeInterval,
    },

    /// Interval start lies after its stop.
    #[error("interval start {start} is after stop {stop}")]
    InvalidInterval {
        start: NaiveDateTime,
        stop: NaiveDateTime,
    },

    /// Decoded data failed integrity checks under `LoadPolicy::Validate`.
    #[error("loaded data failed validation: {}", summarize(.0))]
    InvalidLoad(Vec<ValidationError>),
}

impl Error {
    /// Builds a conflict error naming `resource` and the assignment it already holds.
    pub(crate) fn conflict(resource_tag: &str, resource_id: &str, existing: &Assignment) -> Self {
        Self::SchedulingConflict {
            resource_tag: resource_tag.to_string(),
            resource_id: resource_id.to_string(),
            task_id: existing.task_id().to_string(),
            interval: existing.interval(),
        }
    }

    pub(crate) fn malformed(
        tag: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedEnvelope {
            tag: tag.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Whether the caller can recover by choosing another slot.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::SchedulingConflict { .. })
    }
}

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationErrorKind;

    #[test]
    fn test_display_messages() {
        let e = Error::UnknownTag {
            tag: "nonexistent_type".into(),
        };
        assert_eq!(
            e.to_string(),
            "no reconstructor registered for tag: nonexistent_type"
        );

        let e = Error::malformed("person", "email", "missing");
        assert_eq!(
            e.to_string(),
            "malformed `person` envelope, field `email`: missing"
        );
        assert!(!e.is_conflict());
    }

    #[test]
    fn test_invalid_load_lists_problems() {
        let e = Error::InvalidLoad(vec![
            ValidationError::new(ValidationErrorKind::DuplicateId, "Duplicate person ID: p1"),
            ValidationError::new(ValidationErrorKind::UnsortedAssignments, "out of order"),
        ]);
        assert_eq!(
            e.to_string(),
            "loaded data failed validation: Duplicate person ID: p1; out of order"
        );
    }
}
