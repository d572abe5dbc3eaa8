use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool};
use std::str::FromStr;

use crate::models::{Event, Registration, RegistrationHistoryEntry};

/// Initialize database connection pool with recommended pragmas.
pub async fn init_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .busy_timeout(std::time::Duration::from_secs(5))
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

    SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await
}

/// Run database migrations.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(include_str!("../migrations/001_create_tables.sql"))
        .execute(pool)
        .await?;
    Ok(())
}

/// Insert a new event. Event creation is administrative; registration never
/// creates events.
pub async fn insert_event(
    pool: &SqlitePool,
    title: &str,
    instructor: &str,
    open_at: DateTime<Utc>,
    max_capacity: i64,
) -> Result<Event, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO events (title, instructor, open_at, current_capacity, max_capacity)
        VALUES (?, ?, ?, 0, ?)
        "#,
    )
    .bind(title)
    .bind(instructor)
    .bind(open_at)
    .bind(max_capacity)
    .execute(pool)
    .await?;

    let event = sqlx::query_as::<_, Event>(
        "SELECT id, title, instructor, open_at, current_capacity, max_capacity FROM events WHERE id = ?",
    )
    .bind(result.last_insert_rowid())
    .fetch_one(pool)
    .await?;

    Ok(event)
}

/// Fetch an event by id, or None if it does not exist.
pub async fn get_event<'e, E>(executor: E, event_id: i64) -> Result<Option<Event>, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Event>(
        "SELECT id, title, instructor, open_at, current_capacity, max_capacity FROM events WHERE id = ?",
    )
    .bind(event_id)
    .fetch_optional(executor)
    .await
}

/// Get events whose registration window has opened and that still have free
/// capacity, ordered by opening time.
pub async fn list_open_events(pool: &SqlitePool, now: DateTime<Utc>) -> Result<Vec<Event>, sqlx::Error> {
    sqlx::query_as::<_, Event>(
        r#"
        SELECT id, title, instructor, open_at, current_capacity, max_capacity
        FROM events
        WHERE open_at <= ?
          AND current_capacity < max_capacity
        ORDER BY open_at ASC
        "#,
    )
    .bind(now)
    .fetch_all(pool)
    .await
}

/// Atomically increment an event's enrollment counter, guarded by the
/// capacity limit in the same statement. Returns true iff a slot was taken.
///
/// This conditional update is the concurrency boundary for the capacity
/// invariant: two callers racing on the last slot cannot both see
/// `rows_affected() == 1`.
pub async fn try_increment_capacity<'e, E>(executor: E, event_id: i64) -> Result<bool, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        UPDATE events
        SET current_capacity = current_capacity + 1
        WHERE id = ? AND current_capacity < max_capacity
        "#,
    )
    .bind(event_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Check whether a registration already exists for (event, user).
pub async fn exists_registration<'e, E>(
    executor: E,
    event_id: i64,
    user_id: i64,
) -> Result<bool, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM registrations WHERE event_id = ? AND user_id = ?")
            .bind(event_id)
            .bind(user_id)
            .fetch_one(executor)
            .await?;

    Ok(count > 0)
}

/// Insert a registration row. The UNIQUE(event_id, user_id) constraint is the
/// storage-level backstop against duplicates: a racing duplicate surfaces as a
/// unique-violation database error, never as a silent second row.
pub async fn insert_registration<'e, E>(
    executor: E,
    event_id: i64,
    user_id: i64,
    created_at: DateTime<Utc>,
) -> Result<Registration, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Registration>(
        r#"
        INSERT INTO registrations (event_id, user_id, created_at)
        VALUES (?, ?, ?)
        RETURNING id, event_id, user_id, created_at
        "#,
    )
    .bind(event_id)
    .bind(user_id)
    .bind(created_at)
    .fetch_one(executor)
    .await
}

/// Get all registrations for an event.
pub async fn list_event_registrations(
    pool: &SqlitePool,
    event_id: i64,
) -> Result<Vec<Registration>, sqlx::Error> {
    sqlx::query_as::<_, Registration>(
        r#"
        SELECT id, event_id, user_id, created_at
        FROM registrations
        WHERE event_id = ?
        ORDER BY id ASC
        "#,
    )
    .bind(event_id)
    .fetch_all(pool)
    .await
}

/// Get a user's registration history, joined with event metadata.
pub async fn list_user_registrations(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Vec<RegistrationHistoryEntry>, sqlx::Error> {
    sqlx::query_as::<_, RegistrationHistoryEntry>(
        r#"
        SELECT r.id, r.event_id, r.user_id, r.created_at, e.title, e.instructor
        FROM registrations r
        JOIN events e ON e.id = r.event_id
        WHERE r.user_id = ?
        ORDER BY r.id ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}
