use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Longest version string returned by the health check
pub const VERSION_DISPLAY_LEN: usize = 50;

/// Row to insert into `items`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct NewItem {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedItem {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ItemError {
    /// No connection could be leased (pool missing, exhausted or closed)
    #[error("Database unavailable: {0}")]
    Unavailable(String),
    #[error("Database error: {0}")]
    Database(String),
}

#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Version string reported by the server
    async fn server_version(&self) -> Result<String, ItemError>;

    /// Insert one row and return its generated id
    async fn insert_item(&self, item: &NewItem) -> Result<i64, ItemError>;
}

#[async_trait]
pub trait ItemService: Send + Sync {
    /// Liveness check against the database, returning its (truncated) version
    async fn database_version(&self) -> Result<String, ItemError>;

    async fn create_item(&self, item: NewItem) -> Result<CreatedItem, ItemError>;
}
