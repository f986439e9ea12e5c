use std::time::Duration;

use sqlx::{pool::PoolOptions, Pool, Postgres};

use crate::settings::Config;

/// Postgres pool for the whole process. Each request handler checks out one
/// connection and runs its full call chain inside a single transaction.
pub async fn init_pool(config: &Config) -> Pool<Postgres> {
    PoolOptions::new()
        .min_connections(2)
        .max_connections(50)
        .acquire_timeout(Duration::from_secs(5))
        .idle_timeout(Duration::from_secs(30))
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database")
}
