use sqlx::SqlitePool;

use crate::registration::EventLocks;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub locks: EventLocks,
}

impl AppState {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            locks: EventLocks::new(),
        }
    }
}
