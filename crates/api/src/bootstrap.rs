//! One-shot startup sequence of both services.
//!
//! Any error returned from here is fatal: the binary logs it and exits before
//! binding its listener.

use std::sync::Arc;

use anyhow::Context;
use database::Database;
use services::diagnostics::ProbeTarget;
use services::item::ItemServiceImpl;
use services::vault::{self, resolve_secret, SecretsVault};
use services::vm::{SftpFileWriter, VmWriterServiceImpl};
use services::{DbCredentials, VmCredentials};

use crate::state::{ItemAppState, VmWriterAppState};

/// Read config, authenticate to the vault with the API key, resolve the
/// database secret and build the pool.
pub async fn bootstrap_item_service(settings: &config::Config) -> anyhow::Result<ItemAppState> {
    tracing::info!("--- Initializing item service dependencies ---");

    let service_config = config::ItemServiceConfig::from_env()?;
    let vault = vault::connect_with_api_key(&service_config.oci, &settings.vault)
        .context("Failed to initialize vault client")?;
    tracing::info!("Vault client initialized with API key");

    let state = build_item_state(&vault, &service_config.db_secret_ocid, &settings.pool).await?;
    tracing::info!("--- Item service dependencies initialized ---");
    Ok(state)
}

pub async fn build_item_state(
    vault: &dyn SecretsVault,
    db_secret_ocid: &str,
    timeouts: &config::PoolTimeouts,
) -> anyhow::Result<ItemAppState> {
    let credentials: DbCredentials = resolve_secret(vault, db_secret_ocid)
        .await
        .context("Failed to resolve database credentials")?;
    tracing::info!(
        "Database secret for {}:{}/{} retrieved from vault",
        credentials.host,
        credentials.port,
        credentials.dbname
    );

    let db = Database::from_credentials(&credentials, timeouts)?;
    let item_service = Arc::new(ItemServiceImpl::new(db.item_repository()));

    Ok(ItemAppState::new(
        item_service,
        Some(ProbeTarget {
            host: credentials.host,
            port: credentials.port,
        }),
    ))
}

/// Read config, authenticate to the vault with the resource principal and
/// resolve the VM secret.
pub async fn bootstrap_vm_writer(settings: &config::Config) -> anyhow::Result<VmWriterAppState> {
    tracing::info!("--- Initializing VM writer dependencies ---");

    let service_config = config::VmWriterConfig::from_env()?;
    let vault = vault::connect_with_resource_principal(&settings.vault)
        .context("Failed to initialize vault client")?;
    tracing::info!("Vault client initialized with resource principal");

    let state = build_vm_writer_state(&vault, &service_config, &settings.ssh).await?;
    tracing::info!("--- VM writer dependencies initialized ---");
    Ok(state)
}

pub async fn build_vm_writer_state(
    vault: &dyn SecretsVault,
    service_config: &config::VmWriterConfig,
    ssh: &config::SshConfig,
) -> anyhow::Result<VmWriterAppState> {
    let credentials: VmCredentials = resolve_secret(vault, &service_config.vm_secret_ocid)
        .await
        .context("Failed to resolve VM credentials")?;
    tracing::info!("VM secret for host {} retrieved from vault", credentials.host);

    let writer = Arc::new(SftpFileWriter::new(
        service_config.host_key_fingerprint.clone(),
    ));
    let service = VmWriterServiceImpl::new(Some(Arc::new(credentials)), writer, ssh.timeout);

    Ok(VmWriterAppState::new(Arc::new(service)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use services::vault::test_helpers::MockSecretsVault;
    use std::time::Duration;

    fn timeouts() -> config::PoolTimeouts {
        config::PoolTimeouts {
            wait: Duration::from_secs(1),
            connect: Duration::from_secs(1),
        }
    }

    #[tokio::test]
    async fn test_item_state_from_db_secret() {
        let vault = MockSecretsVault::new().with_json_secret(
            "ocid1.vaultsecret.oc1..db",
            &json!({"host": "10.0.0.146", "port": 6432, "dbname": "app", "username": "u", "password": "p"}),
        );

        let state = build_item_state(&vault, "ocid1.vaultsecret.oc1..db", &timeouts())
            .await
            .unwrap();

        assert_eq!(
            state.probe_target,
            Some(ProbeTarget {
                host: "10.0.0.146".into(),
                port: 6432
            })
        );
        assert_eq!(vault.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_incomplete_db_secret_is_fatal() {
        let vault = MockSecretsVault::new().with_json_secret(
            "db",
            &json!({"host": "10.0.0.146", "port": 6432, "dbname": "app", "username": "u"}),
        );

        let err = build_item_state(&vault, "db", &timeouts()).await.err().unwrap();
        assert!(format!("{err:#}").contains("password"), "{err:#}");
    }

    #[tokio::test]
    async fn test_vm_state_from_vm_secret() {
        let vault = MockSecretsVault::new().with_json_secret(
            "vm",
            &json!({"host": "10.0.1.5", "username": "opc", "private_key": "key"}),
        );
        let service_config = config::VmWriterConfig {
            vm_secret_ocid: "vm".into(),
            host_key_fingerprint: None,
        };
        let ssh = config::SshConfig {
            timeout: Duration::from_secs(5),
        };

        assert!(build_vm_writer_state(&vault, &service_config, &ssh).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_vm_secret_is_fatal() {
        let vault = MockSecretsVault::new();
        let service_config = config::VmWriterConfig {
            vm_secret_ocid: "absent".into(),
            host_key_fingerprint: None,
        };
        let ssh = config::SshConfig {
            timeout: Duration::from_secs(5),
        };

        let err = build_vm_writer_state(&vault, &service_config, &ssh)
            .await
            .err()
            .unwrap();
        assert!(format!("{err:#}").contains("HTTP 404"), "{err:#}");
    }
}
