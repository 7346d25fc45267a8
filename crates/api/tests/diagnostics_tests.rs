mod common;

use common::{create_item_server_with_probe, create_uninitialized_item_server};
use services::diagnostics::ProbeTarget;
use services::item::service::test_helpers::MockItemRepository;
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::test]
async fn test_connectivity_to_listening_port() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = create_item_server_with_probe(
        Arc::new(MockItemRepository::new(5)),
        Some(ProbeTarget {
            host: "127.0.0.1".into(),
            port,
        }),
    );

    let response = server.get("/diagnostics/connectivity").await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "success");
    assert!(body["message"].as_str().unwrap().starts_with("SUCCESS"));
}

#[tokio::test]
async fn test_connectivity_refused_is_500() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let server = create_item_server_with_probe(
        Arc::new(MockItemRepository::new(5)),
        Some(ProbeTarget {
            host: "127.0.0.1".into(),
            port,
        }),
    );

    let response = server.get("/diagnostics/connectivity").await;

    assert_eq!(response.status_code(), 500);
    let body: serde_json::Value = response.json();
    assert!(body["detail"].as_str().unwrap().starts_with("FAILURE"));
}

#[tokio::test]
async fn test_connectivity_without_credentials_is_503() {
    let server = create_uninitialized_item_server();
    let response = server.get("/diagnostics/connectivity").await;
    assert_eq!(response.status_code(), 503);
}
