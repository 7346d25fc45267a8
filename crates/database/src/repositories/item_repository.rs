use crate::pool::DbPool;
use async_trait::async_trait;
use deadpool_postgres::PoolError;
use services::item::{ItemError, ItemRepository, NewItem};
use tokio_postgres::Row;

pub struct PostgresItemRepository {
    pool: DbPool,
}

impl PostgresItemRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Lease a connection; it goes back to the pool when the returned object drops.
    async fn lease(&self) -> Result<deadpool_postgres::Object, ItemError> {
        self.pool.get().await.map_err(|e| {
            tracing::error!("Failed to lease database connection: {}", e);
            match e {
                PoolError::Backend(e) => ItemError::Database(e.to_string()),
                other => ItemError::Unavailable(other.to_string()),
            }
        })
    }
}

fn db_error(e: tokio_postgres::Error) -> ItemError {
    ItemError::Database(e.to_string())
}

/// `id` may be SERIAL or BIGSERIAL
fn generated_id(row: &Row) -> Result<i64, ItemError> {
    row.try_get::<_, i64>(0)
        .or_else(|_| row.try_get::<_, i32>(0).map(i64::from))
        .map_err(db_error)
}

#[async_trait]
impl ItemRepository for PostgresItemRepository {
    async fn server_version(&self) -> Result<String, ItemError> {
        let client = self.lease().await?;
        let row = client
            .query_one("SELECT version()", &[])
            .await
            .map_err(db_error)?;
        row.try_get(0).map_err(db_error)
    }

    async fn insert_item(&self, item: &NewItem) -> Result<i64, ItemError> {
        let mut client = self.lease().await?;
        let transaction = client.transaction().await.map_err(db_error)?;

        let row = transaction
            .query_one(
                "INSERT INTO items (name, description) VALUES ($1, $2) RETURNING id",
                &[&item.name, &item.description],
            )
            .await
            .map_err(db_error)?;
        let id = generated_id(&row)?;

        transaction.commit().await.map_err(db_error)?;
        Ok(id)
    }
}
