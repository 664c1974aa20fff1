//! # PostgreSQL document store
//!
//! Each collection is a table of JSONB documents. Filters are translated to
//! JSONB predicates with `sqlx::QueryBuilder`; their semantics must match
//! the `matches` methods of the domain filters.

mod filters;
mod pets;
mod posts;
mod users;

pub use pets::PgPetRepository;
pub use posts::PgPostRepository;
pub use users::PgUserRepository;

use domains::DomainError;
use sqlx::postgres::{PgPool, PgPoolOptions};

/// Opens a pool and brings the schema up to date.
pub async fn connect(url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!(max_connections, "postgres pool ready, migrations applied");
    Ok(pool)
}

/// Infrastructure failures are logged here and surfaced opaquely.
pub(crate) fn db_error(err: sqlx::Error) -> DomainError {
    tracing::error!(error = %err, "database operation failed");
    DomainError::server("database operation failed")
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}
