pub mod pool;
pub mod repositories;

pub use pool::{create_pool, ConnectionString, DbPool, POOL_MAX_SIZE};
pub use repositories::PostgresItemRepository;

use anyhow::Result;
use services::DbCredentials;
use std::sync::Arc;

/// Database service combining all repositories
pub struct Database {
    pool: DbPool,
}

impl Database {
    /// Create a new database service from a connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Build the pool from credentials resolved out of the vault
    pub fn from_credentials(
        credentials: &DbCredentials,
        timeouts: &config::PoolTimeouts,
    ) -> Result<Self> {
        let pool = create_pool(credentials, timeouts)?;
        Ok(Self::new(pool))
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub fn item_repository(&self) -> Arc<PostgresItemRepository> {
        Arc::new(PostgresItemRepository::new(self.pool.clone()))
    }
}
