use utoipa::OpenApi;

/// OpenAPI document of the item service
#[derive(OpenApi)]
#[openapi(
    info(
        title = "PostgreSQL Item Inserter",
        description = "Inserts items into a PostgreSQL database whose credentials live in OCI Vault.",
        version = "0.1.0",
        license(name = "MIT",)
    ),
    paths(
        crate::routes::items::health_check,
        crate::routes::items::create_item,
        crate::routes::diagnostics::connectivity,
    ),
    components(schemas(
        services::item::NewItem,
        crate::models::DatabaseHealthResponse,
        crate::models::CreateItemResponse,
        crate::models::StatusResponse,
        crate::error::ApiErrorResponse,
    )),
    tags(
        (name = "Monitoring", description = "Liveness and connectivity checks"),
        (name = "Data Ingestion", description = "Item insertion"),
    )
)]
pub struct ItemApiDoc;

/// OpenAPI document of the VM writer service
#[derive(OpenApi)]
#[openapi(
    info(
        title = "VM File Writer",
        description = "Writes files to a VM over SSH/SFTP using credentials from OCI Vault.",
        version = "0.1.0",
        license(name = "MIT",)
    ),
    paths(
        crate::routes::vm::health_check,
        crate::routes::vm::write_file,
    ),
    components(schemas(
        services::vm::VmWriteRequest,
        crate::models::HealthResponse,
        crate::models::StatusResponse,
        crate::error::ApiErrorResponse,
    )),
    tags(
        (name = "Monitoring", description = "Liveness checks"),
        (name = "VM Operations", description = "Remote file writes"),
    )
)]
pub struct VmWriterApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_doc_lists_routes() {
        let doc = ItemApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        assert!(paths.iter().any(|p| *p == "/call"));
        assert!(paths.iter().any(|p| *p == "/health"));
        assert!(paths.iter().any(|p| *p == "/diagnostics/connectivity"));
    }

    #[test]
    fn test_vm_doc_lists_routes() {
        let doc = VmWriterApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/write-file"));
    }
}
