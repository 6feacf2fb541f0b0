use std::sync::Arc;

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::storage::{MemStorage, OkrStore, PgStorage};

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Picks the store backend. PostgreSQL gets its migrations applied first.
pub async fn build_store(database_url: Option<&str>) -> Result<Arc<dyn OkrStore>> {
    match database_url {
        Some(url) => {
            let storage = PgStorage::new(create_pool(url).await?);
            storage.migrate().await?;
            Ok(Arc::new(storage))
        }
        None => {
            warn!("DATABASE_URL not set; using the in-memory store (data is lost on restart)");
            Ok(Arc::new(MemStorage::new()))
        }
    }
}
