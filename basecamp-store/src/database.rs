use basecamp_core::repository::{RepoResult, RepositoryError};
use basecamp_core::CoreError;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

#[derive(Clone)]
pub struct DbClient {
    pub pool: Pool<Postgres>,
}

impl DbClient {
    pub async fn new(connection_string: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(connection_string)
            .await?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("../migrations")
            .run(&self.pool)
            .await?;
        info!("Migrations completed successfully.");
        Ok(())
    }
}

/// Maps a sqlx failure onto the repository seam. Unique violations become
/// `Duplicate` so handlers can answer 409.
pub(crate) fn db_err(err: sqlx::Error) -> RepositoryError {
    if let Some(db) = err.as_database_error() {
        if db.is_unique_violation() {
            let constraint = db.constraint().unwrap_or("unique constraint").to_string();
            return RepositoryError::Duplicate(constraint);
        }
    }
    RepositoryError::backend(err)
}

/// Decodes a TEXT column holding one of the domain enums.
pub(crate) fn decode<T>(raw: &str) -> RepoResult<T>
where
    T: FromStr<Err = CoreError>,
{
    raw.parse::<T>().map_err(RepositoryError::backend)
}
