//! # Campus DB
//!
//! Stores for the Campus identity service.
//!
//! The identity core talks to persistence only through the traits in
//! [`store`]. Two implementations exist:
//!
//! - [`PgStore`]: PostgreSQL through SQLx, with row locks for token redemption
//! - [`MemoryStore`]: in-process state for tests and local runs
//!
//! # Example
//!
//! ```ignore
//! use campus_config::DatabaseConfig;
//! use campus_db::{PgStore, init_db_pool};
//!
//! let pool = init_db_pool(&DatabaseConfig::from_env()).await?;
//! let store = PgStore::new(pool);
//! ```

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

use campus_config::DatabaseConfig;
use sqlx::postgres::PgPoolOptions;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use store::{IdentityStore, IdentityTransaction, RoleStore, StoreResult};

// Re-export PgPool for convenience
pub use sqlx::PgPool;

/// Initializes a PostgreSQL connection pool from the database configuration.
///
/// Acquiring a connection waits at most `acquire_timeout`; callers see the
/// timeout as [`StoreError::Unavailable`].
///
/// # Errors
///
/// Fails when `DATABASE_URL` is missing or the first connection cannot be
/// established.
pub async fn init_db_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let url = config
        .url
        .as_deref()
        .ok_or_else(|| sqlx::Error::Configuration("DATABASE_URL must be set".into()))?;

    tracing::info!(
        max_connections = config.max_connections,
        "Connecting to PostgreSQL"
    );

    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect(url)
        .await
}
