mod common;

use common::create_item_server;
use database::pool::POOL_MAX_SIZE;
use futures::future::join_all;
use serde_json::json;
use services::item::service::test_helpers::MockItemRepository;
use services::item::ItemError;
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

// The handler-level bound is modelled by the mock sized like the real pool.
// The deadpool bound itself is covered in the database crate's repository
// tests and, against a live server, in `database/tests/live_database.rs`.
const POOL_SIZE: usize = POOL_MAX_SIZE;

#[tokio::test]
async fn test_concurrent_inserts_never_exceed_pool_bound() {
    let repo = Arc::new(MockItemRepository::new(POOL_SIZE).with_hold(Duration::from_millis(50)));
    let server = create_item_server(repo.clone());

    let requests = (0..10).map(|i| {
        server
            .post("/call")
            .json(&json!({"name": format!("item-{i}")}))
            .into_future()
    });
    let responses = join_all(requests).await;

    for response in &responses {
        assert_eq!(response.status_code(), 200);
    }
    assert!(repo.peak_leases() <= POOL_SIZE);
    assert!(repo.peak_leases() > 1, "requests should overlap");
    assert_eq!(repo.leased(), 0);
    assert_eq!(repo.available_permits(), POOL_SIZE);
    assert_eq!(repo.inserted().len(), 10);
}

#[tokio::test]
async fn test_failed_queries_return_their_lease() {
    let repo = Arc::new(
        MockItemRepository::new(POOL_SIZE)
            .with_hold(Duration::from_millis(20))
            .failing(ItemError::Database("deadlock detected".into())),
    );
    let server = create_item_server(repo.clone());

    let requests = (0..10).map(|_| server.post("/call").json(&json!({"name": "x"})).into_future());
    let responses = join_all(requests).await;

    for response in &responses {
        assert_eq!(response.status_code(), 500);
    }
    assert!(repo.peak_leases() <= POOL_SIZE);
    assert_eq!(repo.leased(), 0);
    assert_eq!(repo.available_permits(), POOL_SIZE);
}
