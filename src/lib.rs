pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod registration;
pub mod routes;
pub mod state;

pub use config::Config;
pub use db::{init_pool, run_migrations};
pub use error::RegisterError;
pub use models::{Event, Registration};
pub use registration::{register, EventLocks};
pub use routes::create_router;
pub use state::AppState;
