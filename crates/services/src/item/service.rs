use async_trait::async_trait;
use std::sync::Arc;

use super::ports::{
    CreatedItem, ItemError, ItemRepository, ItemService, NewItem, VERSION_DISPLAY_LEN,
};

pub struct ItemServiceImpl {
    repository: Option<Arc<dyn ItemRepository>>,
}

impl ItemServiceImpl {
    pub fn new(repository: Arc<dyn ItemRepository>) -> Self {
        Self {
            repository: Some(repository),
        }
    }

    /// Service whose database was never set up; every call fails as unavailable.
    pub fn unavailable() -> Self {
        Self { repository: None }
    }

    fn repository(&self) -> Result<&Arc<dyn ItemRepository>, ItemError> {
        self.repository
            .as_ref()
            .ok_or_else(|| ItemError::Unavailable("database pool is not initialized".to_string()))
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[async_trait]
impl ItemService for ItemServiceImpl {
    async fn database_version(&self) -> Result<String, ItemError> {
        let version = self.repository()?.server_version().await?;
        tracing::debug!(version = %version, "Database version retrieved");
        Ok(truncate_chars(&version, VERSION_DISPLAY_LEN))
    }

    async fn create_item(&self, item: NewItem) -> Result<CreatedItem, ItemError> {
        let repository = self.repository()?;
        tracing::info!("Inserting item: name={}", item.name);

        let id = repository.insert_item(&item).await?;

        tracing::info!("Item inserted: id={}, name={}", id, item.name);
        Ok(CreatedItem {
            id,
            name: item.name,
        })
    }
}

pub mod test_helpers {
    use super::*;
    use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::Semaphore;

    /// In-memory repository that behaves like a 5-connection pool.
    ///
    /// Each call holds one of `capacity` permits for `hold` before answering,
    /// and records the highest number of permits held at once.
    pub struct MockItemRepository {
        permits: Semaphore,
        in_use: AtomicUsize,
        peak: AtomicUsize,
        next_id: AtomicI64,
        hold: Duration,
        version: String,
        failure: Option<ItemError>,
        inserted: Mutex<Vec<NewItem>>,
    }

    impl MockItemRepository {
        pub fn new(capacity: usize) -> Self {
            Self {
                permits: Semaphore::new(capacity),
                in_use: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                next_id: AtomicI64::new(1),
                hold: Duration::ZERO,
                version: "PostgreSQL 16.4 on x86_64-pc-linux-gnu, compiled by gcc (GCC) 11.4.1"
                    .to_string(),
                failure: None,
                inserted: Mutex::new(Vec::new()),
            }
        }

        pub fn with_hold(mut self, hold: Duration) -> Self {
            self.hold = hold;
            self
        }

        pub fn with_version(mut self, version: &str) -> Self {
            self.version = version.to_string();
            self
        }

        /// Every call fails with `error` after leasing a permit
        pub fn failing(mut self, error: ItemError) -> Self {
            self.failure = Some(error);
            self
        }

        pub fn peak_leases(&self) -> usize {
            self.peak.load(Ordering::SeqCst)
        }

        pub fn leased(&self) -> usize {
            self.in_use.load(Ordering::SeqCst)
        }

        pub fn available_permits(&self) -> usize {
            self.permits.available_permits()
        }

        pub fn inserted(&self) -> Vec<NewItem> {
            self.inserted
                .lock()
                .map(|items| items.clone())
                .unwrap_or_default()
        }

        async fn leased_call<T>(&self, f: impl FnOnce() -> T) -> Result<T, ItemError> {
            let _permit = self
                .permits
                .acquire()
                .await
                .map_err(|_| ItemError::Unavailable("pool closed".to_string()))?;

            let now = self.in_use.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);

            if !self.hold.is_zero() {
                tokio::time::sleep(self.hold).await;
            }

            let result = match &self.failure {
                Some(ItemError::Unavailable(msg)) => Err(ItemError::Unavailable(msg.clone())),
                Some(ItemError::Database(msg)) => Err(ItemError::Database(msg.clone())),
                None => Ok(f()),
            };

            self.in_use.fetch_sub(1, Ordering::SeqCst);
            result
        }
    }

    #[async_trait]
    impl ItemRepository for MockItemRepository {
        async fn server_version(&self) -> Result<String, ItemError> {
            self.leased_call(|| self.version.clone()).await
        }

        async fn insert_item(&self, item: &NewItem) -> Result<i64, ItemError> {
            self.leased_call(|| {
                if let Ok(mut items) = self.inserted.lock() {
                    items.push(item.clone());
                }
                self.next_id.fetch_add(1, Ordering::SeqCst)
            })
            .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_helpers::MockItemRepository;
    use super::*;

    #[tokio::test]
    async fn test_version_truncated_to_display_length() {
        let repo = Arc::new(MockItemRepository::new(5));
        let service = ItemServiceImpl::new(repo);

        let version = service.database_version().await.unwrap();
        assert_eq!(version.chars().count(), VERSION_DISPLAY_LEN);
        assert!(version.starts_with("PostgreSQL 16.4"));
    }

    #[tokio::test]
    async fn test_short_version_unchanged() {
        let repo = Arc::new(MockItemRepository::new(5).with_version("PostgreSQL 16"));
        let service = ItemServiceImpl::new(repo);
        assert_eq!(service.database_version().await.unwrap(), "PostgreSQL 16");
    }

    #[tokio::test]
    async fn test_create_item_returns_generated_id() {
        let repo = Arc::new(MockItemRepository::new(5));
        let service = ItemServiceImpl::new(repo.clone());

        let first = service
            .create_item(NewItem {
                name: "Sample Item".into(),
                description: None,
            })
            .await
            .unwrap();
        let second = service
            .create_item(NewItem {
                name: "Other".into(),
                description: Some("with description".into()),
            })
            .await
            .unwrap();

        assert_eq!(
            first,
            CreatedItem {
                id: 1,
                name: "Sample Item".into(),
            }
        );
        assert_eq!(second.id, 2);
        assert_eq!(repo.inserted().len(), 2);
    }

    #[tokio::test]
    async fn test_unavailable_service_never_touches_repository() {
        let service = ItemServiceImpl::unavailable();
        assert!(matches!(
            service.database_version().await,
            Err(ItemError::Unavailable(_))
        ));
        assert!(matches!(
            service
                .create_item(NewItem {
                    name: "x".into(),
                    description: None,
                })
                .await,
            Err(ItemError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_failed_insert_releases_lease() {
        let repo = Arc::new(MockItemRepository::new(5).failing(ItemError::Database(
            "relation \"items\" does not exist".into(),
        )));
        let service = ItemServiceImpl::new(repo.clone());

        let err = service
            .create_item(NewItem {
                name: "x".into(),
                description: None,
            })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("items"));
        assert_eq!(repo.leased(), 0);
        assert_eq!(repo.available_permits(), 5);
    }
}
