use time::OffsetDateTime;

use crate::model::Milestone;

/// Errors raised when an entity mutation would break a model invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// A ticket closure instant earlier than its creation instant.
    #[error("ticket {ticket_id} cannot close at {closed_at} before it was created at {created_at}")]
    ClosedBeforeCreated {
        ticket_id: String,
        created_at: OffsetDateTime,
        closed_at: OffsetDateTime,
    },

    /// A survey score outside `0..=10`.
    #[error("survey score {score} is outside 0..=10")]
    ScoreOutOfRange { score: i64 },

    /// A milestone name that is not one of the four requisition milestones.
    #[error("unknown milestone '{0}' (expected one of {names})", names = Milestone::NAMES.join(", "))]
    UnknownMilestone(String),

    /// A required text field was empty.
    #[error("field '{field}' must not be empty")]
    EmptyField { field: &'static str },
}
