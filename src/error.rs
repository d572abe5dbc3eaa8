use thiserror::Error;

/// Outcome of a rejected registration attempt.
///
/// The first four variants are semantic rejections: retrying with the same
/// input is pointless (for `OutOfDate`, until time passes the opening
/// timestamp). `Database` is an infrastructure fault and the only variant a
/// caller may safely retry as-is.
#[derive(Error, Debug)]
pub enum RegisterError {
    #[error("event not found: {0}")]
    EventNotFound(i64),

    #[error("registration for event {0} has not opened yet")]
    OutOfDate(i64),

    #[error("user {user_id} already registered for event {event_id}")]
    AlreadyApplied { event_id: i64, user_id: i64 },

    #[error("event {0} is at full capacity")]
    CapacityFull(i64),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl RegisterError {
    /// Stable code for the `error` field of JSON error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            RegisterError::EventNotFound(_) => "event_not_found",
            RegisterError::OutOfDate(_) => "out_of_date",
            RegisterError::AlreadyApplied { .. } => "already_applied",
            RegisterError::CapacityFull(_) => "capacity_full",
            RegisterError::Database(_) => "database_error",
        }
    }
}
