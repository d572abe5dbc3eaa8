use chrono::{DateTime, Utc};
use dashmap::DashMap;
use sqlx::{Connection, SqlitePool};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::db;
use crate::error::RegisterError;
use crate::models::Registration;

/// Per-event lock registry. Attempts for the same event serialize on one
/// mutex; attempts for different events never block each other. Locks are
/// never nested across events, so no ordering cycle can arise.
#[derive(Clone, Default)]
pub struct EventLocks {
    locks: Arc<DashMap<i64, Arc<Mutex<()>>>>,
}

impl EventLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn for_event(&self, event_id: i64) -> Arc<Mutex<()>> {
        self.locks.entry(event_id).or_default().clone()
    }
}

/// Register `user_id` for `event_id`, evaluated at instant `now`.
///
/// The eligibility checks run in order: the event must exist, its
/// registration window must have opened, the user must not already hold a
/// registration, and a capacity slot must be free. The uniqueness and
/// capacity checks are re-validated inside the per-event critical section and
/// inside a single transaction with the writes, so concurrent attempts cannot
/// both claim the last slot or both register the same user.
///
/// On success exactly one registration row and one capacity increment commit
/// together; on any rejection nothing is written.
pub async fn register(
    pool: &SqlitePool,
    locks: &EventLocks,
    user_id: i64,
    event_id: i64,
    now: DateTime<Utc>,
) -> Result<Registration, RegisterError> {
    let event = db::get_event(pool, event_id)
        .await?
        .ok_or(RegisterError::EventNotFound(event_id))?;

    if now < event.open_at {
        return Err(RegisterError::OutOfDate(event_id));
    }

    let lock = locks.for_event(event_id);
    let _guard = lock.lock().await;

    let mut conn = pool.acquire().await?;
    // IMMEDIATE takes the write lock before the reads below; a deferred
    // transaction upgrading from read to write can fail with BUSY_SNAPSHOT
    // in WAL mode when an unrelated registration commits in between.
    let mut tx = conn.begin_with("BEGIN IMMEDIATE").await?;

    if db::exists_registration(&mut *tx, event_id, user_id).await? {
        return Err(RegisterError::AlreadyApplied { event_id, user_id });
    }

    if !db::try_increment_capacity(&mut *tx, event_id).await? {
        return Err(RegisterError::CapacityFull(event_id));
    }

    // The unique constraint is the backstop for races the in-process lock
    // cannot see, e.g. a second server instance on the same database.
    let registration = db::insert_registration(&mut *tx, event_id, user_id, now)
        .await
        .map_err(|e| {
            if e.as_database_error()
                .is_some_and(|d| d.is_unique_violation())
            {
                RegisterError::AlreadyApplied { event_id, user_id }
            } else {
                RegisterError::Database(e)
            }
        })?;

    tx.commit().await?;

    Ok(registration)
}
