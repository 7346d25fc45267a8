mod common;

use api::INVOCATION_ID_HEADER;
use common::{create_item_server, create_vm_server};
use http::{HeaderName, HeaderValue};
use services::item::service::test_helpers::MockItemRepository;
use services::vm::service::test_helpers::MockRemoteFileWriter;
use std::sync::Arc;

const INVOKE_ID: HeaderName = HeaderName::from_static("fn-invoke-id");

#[tokio::test]
async fn test_inbound_invocation_id_is_echoed() {
    let server = create_item_server(Arc::new(MockItemRepository::new(5)));

    let response = server
        .get("/health")
        .add_header(INVOKE_ID, HeaderValue::from_static("ocid1.fnapp.invoke-42"))
        .await;

    assert_eq!(response.header(INVOCATION_ID_HEADER), "ocid1.fnapp.invoke-42");
}

#[tokio::test]
async fn test_invocation_id_generated_when_absent() {
    let server = create_vm_server(Arc::new(MockRemoteFileWriter::new()));

    let first = server.get("/health").await;
    let second = server.get("/health").await;

    let first_id = first.header(INVOCATION_ID_HEADER);
    let second_id = second.header(INVOCATION_ID_HEADER);
    let first_id = first_id.to_str().unwrap();
    assert!(uuid::Uuid::parse_str(first_id).is_ok());
    assert_ne!(first_id, second_id.to_str().unwrap());
}

#[tokio::test]
async fn test_invocation_id_on_error_responses() {
    let server = common::create_uninitialized_item_server();

    let response = server
        .get("/health")
        .add_header(INVOKE_ID, HeaderValue::from_static("err-1"))
        .await;

    assert_eq!(response.status_code(), 503);
    assert_eq!(response.header(INVOCATION_ID_HEADER), "err-1");
}
