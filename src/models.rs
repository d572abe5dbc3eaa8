use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A capacity-limited scheduled event open for registration.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub instructor: String,
    /// Registration is rejected with `OutOfDate` before this instant.
    pub open_at: DateTime<Utc>,
    pub current_capacity: i64,
    pub max_capacity: i64,
}

/// A durable record that a user has claimed one of an event's capacity slots.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Registration {
    pub id: i64,
    pub event_id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Request body for POST /events/apply.
#[derive(Debug, Deserialize)]
pub struct ApplyRequest {
    pub user_id: i64,
    pub event_id: i64,
}

/// Response for a successful registration.
#[derive(Debug, Serialize)]
pub struct ApplyResponse {
    pub status: &'static str, // always "registered"
    pub registration: Registration,
}

/// Response for GET /events.
#[derive(Debug, Serialize)]
pub struct GetEventsResponse {
    pub server_time: DateTime<Utc>,
    pub events: Vec<Event>,
}

/// A registration joined with the event it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RegistrationHistoryEntry {
    pub id: i64,
    pub event_id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub instructor: String,
}

/// Response for GET /events/registrations/{user_id}.
#[derive(Debug, Serialize)]
pub struct GetRegistrationsResponse {
    pub user_id: i64,
    pub registrations: Vec<RegistrationHistoryEntry>,
}

/// JSON error body with a stable machine-checkable code.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}
