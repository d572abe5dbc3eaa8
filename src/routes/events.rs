use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;

use crate::db;
use crate::error::RegisterError;
use crate::models::{
    ApplyRequest, ApplyResponse, ErrorBody, GetEventsResponse, GetRegistrationsResponse,
};
use crate::registration;
use crate::state::AppState;

/// GET /events - Events whose registration window is open and that still
/// have free capacity.
pub async fn get_open_events(State(state): State<AppState>) -> Response {
    let now = Utc::now();

    match db::list_open_events(&state.pool, now).await {
        Ok(events) => Json(GetEventsResponse {
            server_time: now,
            events,
        })
        .into_response(),
        Err(e) => {
            tracing::error!("Failed to list open events: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Database error").into_response()
        }
    }
}

/// POST /events/apply - Register a user for an event.
///
/// Every capacity- and uniqueness-sensitive decision is delegated to the
/// registration core; this handler only translates the outcome to HTTP.
pub async fn apply(State(state): State<AppState>, Json(req): Json<ApplyRequest>) -> Response {
    match registration::register(&state.pool, &state.locks, req.user_id, req.event_id, Utc::now())
        .await
    {
        Ok(registration) => (
            StatusCode::CREATED,
            Json(ApplyResponse {
                status: "registered",
                registration,
            }),
        )
            .into_response(),
        Err(e) => {
            let status = match &e {
                RegisterError::EventNotFound(_) => StatusCode::NOT_FOUND,
                RegisterError::OutOfDate(_) => StatusCode::BAD_REQUEST,
                RegisterError::AlreadyApplied { .. } => StatusCode::CONFLICT,
                RegisterError::CapacityFull(_) => StatusCode::CONFLICT,
                RegisterError::Database(err) => {
                    tracing::error!("Registration failed: {}", err);
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
            (
                status,
                Json(ErrorBody {
                    error: e.code(),
                    message: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// GET /events/registrations/{user_id} - A user's registration history.
pub async fn get_user_registrations(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Response {
    match db::list_user_registrations(&state.pool, user_id).await {
        Ok(registrations) => Json(GetRegistrationsResponse {
            user_id,
            registrations,
        })
        .into_response(),
        Err(e) => {
            tracing::error!("Failed to list registrations for user {}: {}", user_id, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Database error").into_response()
        }
    }
}
