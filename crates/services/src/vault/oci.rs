//! Client for the OCI Secrets retrieval API.
//!
//! Two identities are supported: an API key (user, tenancy and fingerprint,
//! with the private key read from a file) and the resource principal the
//! functions platform injects into the process environment.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use url::Url;

use super::ports::{SecretBundle, SecretsVault, VaultError};
use super::signer::{parse_private_key, RequestSigner};

pub const SECRETS_API_VERSION: &str = "20190301";

/// Supported resource principal protocol version
pub const RESOURCE_PRINCIPAL_VERSION: &str = "2.2";

pub fn secrets_endpoint(region: &str) -> String {
    format!("https://secrets.vaults.{region}.oci.oraclecloud.com")
}

/// API-key identity with the private key already on disk
#[derive(Debug, Clone)]
pub struct ApiKeyCredentials {
    pub user_ocid: String,
    pub fingerprint: String,
    pub tenancy_ocid: String,
    pub region: String,
    pub key_file: PathBuf,
}

impl ApiKeyCredentials {
    pub fn new(config: &config::OciApiKeyConfig, key_file: &Path) -> Self {
        Self {
            user_ocid: config.user_ocid.trim().to_string(),
            fingerprint: config.fingerprint.trim().to_string(),
            tenancy_ocid: config.tenancy_ocid.trim().to_string(),
            region: config.region.trim().to_string(),
            key_file: key_file.to_path_buf(),
        }
    }

    /// Check that every field is well-formed, reporting all problems at once.
    pub fn validate(&self) -> Result<(), VaultError> {
        let mut problems = Vec::new();

        if !self.user_ocid.starts_with("ocid1.user.") {
            problems.push("user must be an OCID of the form ocid1.user.*".to_string());
        }
        if !self.tenancy_ocid.starts_with("ocid1.tenancy.") {
            problems.push("tenancy must be an OCID of the form ocid1.tenancy.*".to_string());
        }
        if !is_fingerprint(&self.fingerprint) {
            problems.push("fingerprint must be 16 colon-separated hex pairs".to_string());
        }
        if !is_region(&self.region) {
            problems.push(format!("region `{}` is not a valid region identifier", self.region));
        }
        if !self.key_file.is_file() {
            problems.push(format!("key file {} does not exist", self.key_file.display()));
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(VaultError::InvalidCredentials(problems))
        }
    }

    pub fn key_id(&self) -> String {
        format!("{}/{}/{}", self.tenancy_ocid, self.user_ocid, self.fingerprint)
    }
}

fn is_fingerprint(value: &str) -> bool {
    let pairs: Vec<&str> = value.split(':').collect();
    pairs.len() == 16
        && pairs
            .iter()
            .all(|p| p.len() == 2 && p.chars().all(|c| c.is_ascii_hexdigit()))
}

fn is_region(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Workload identity issued by the hosting platform
pub struct ResourcePrincipal {
    rpst: String,
    private_pem: String,
    region: String,
}

impl ResourcePrincipal {
    pub fn from_env() -> Result<Self, VaultError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Both the session token and the private key may be given inline or as a
    /// path to a file holding them.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, VaultError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| VaultError::IdentityUnavailable(format!("{key} is not set")))
        };

        let version = require("OCI_RESOURCE_PRINCIPAL_VERSION")?;
        if version.trim() != RESOURCE_PRINCIPAL_VERSION {
            return Err(VaultError::IdentityUnavailable(format!(
                "unsupported resource principal version {version}"
            )));
        }
        if lookup("OCI_RESOURCE_PRINCIPAL_PRIVATE_PEM_PASSPHRASE").is_some_and(|v| !v.is_empty()) {
            return Err(VaultError::IdentityUnavailable(
                "passphrase-protected resource principal keys are not supported".to_string(),
            ));
        }

        let rpst = inline_or_file(&require("OCI_RESOURCE_PRINCIPAL_RPST")?)?;
        let private_pem = inline_or_file(&require("OCI_RESOURCE_PRINCIPAL_PRIVATE_PEM")?)?;
        let region = require("OCI_RESOURCE_PRINCIPAL_REGION")?;

        Ok(Self {
            rpst: rpst.trim().to_string(),
            private_pem,
            region: region.trim().to_string(),
        })
    }

    pub fn key_id(&self) -> String {
        format!("ST${}", self.rpst)
    }

    pub fn region(&self) -> &str {
        &self.region
    }
}

/// Absolute paths name a file holding the value, anything else is the value.
fn inline_or_file(value: &str) -> Result<String, VaultError> {
    let path = Path::new(value.trim());
    if !path.is_absolute() {
        return Ok(value.to_string());
    }
    std::fs::read_to_string(path).map_err(|e| {
        VaultError::IdentityUnavailable(format!("cannot read {}: {e}", path.display()))
    })
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SecretBundleResponse {
    #[serde(default)]
    secret_id: Option<String>,
    #[serde(default)]
    version_number: Option<i64>,
    secret_bundle_content: SecretBundleContent,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SecretBundleContent {
    #[serde(default)]
    content_type: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug)]
pub struct OciVaultClient {
    http_client: reqwest::Client,
    endpoint: Url,
    signer: RequestSigner,
}

impl OciVaultClient {
    pub fn new(
        endpoint: &str,
        signer: RequestSigner,
        timeout: Duration,
    ) -> Result<Self, VaultError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| VaultError::Request(format!("invalid vault endpoint {endpoint}: {e}")))?;
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VaultError::Request(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint,
            signer,
        })
    }

    /// Validate `credentials`, read the key they point at and build a client.
    ///
    /// The key file is read here and never again, so the caller may delete it
    /// as soon as this returns.
    pub fn with_api_key(
        credentials: &ApiKeyCredentials,
        settings: &config::VaultConfig,
    ) -> Result<Self, VaultError> {
        credentials.validate()?;

        let pem = std::fs::read_to_string(&credentials.key_file)
            .map_err(|e| VaultError::SigningKey(format!("cannot read key file: {e}")))?;
        let signer = RequestSigner::new(credentials.key_id(), parse_private_key(&pem)?);

        let endpoint = settings
            .endpoint
            .clone()
            .unwrap_or_else(|| secrets_endpoint(&credentials.region));
        tracing::info!(endpoint = %endpoint, "Vault client configured with API key");

        Self::new(&endpoint, signer, settings.timeout)
    }

    pub fn with_resource_principal(
        principal: ResourcePrincipal,
        settings: &config::VaultConfig,
    ) -> Result<Self, VaultError> {
        let private_key = parse_private_key(&principal.private_pem)?;
        let signer = RequestSigner::new(principal.key_id(), private_key);
        let endpoint = settings
            .endpoint
            .clone()
            .unwrap_or_else(|| secrets_endpoint(principal.region()));
        tracing::info!(endpoint = %endpoint, "Vault client configured with resource principal");

        Self::new(&endpoint, signer, settings.timeout)
    }

    fn host_header(url: &Url) -> Result<String, VaultError> {
        let host = url
            .host_str()
            .ok_or_else(|| VaultError::Request(format!("vault URL {url} has no host")))?;
        Ok(match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        })
    }
}

#[async_trait]
impl SecretsVault for OciVaultClient {
    async fn get_secret_bundle(&self, secret_id: &str) -> Result<SecretBundle, VaultError> {
        let url = self
            .endpoint
            .join(&format!("/{SECRETS_API_VERSION}/secretbundles/{secret_id}"))
            .map_err(|e| VaultError::Request(format!("invalid secret id {secret_id}: {e}")))?;

        let host = Self::host_header(&url)?;
        let date = Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string();
        let authorization = self.signer.authorization("get", url.path(), &host, &date);

        tracing::debug!(secret_id, "Fetching secret bundle");

        let response = self
            .http_client
            .get(url.clone())
            .header("date", &date)
            .header("authorization", authorization)
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| VaultError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(VaultError::Status { status, body });
        }

        let bundle: SecretBundleResponse = response
            .json()
            .await
            .map_err(|e| VaultError::MalformedBundle(e.to_string()))?;

        if let Some(content_type) = bundle.secret_bundle_content.content_type.as_deref() {
            if !content_type.eq_ignore_ascii_case("BASE64") {
                return Err(VaultError::MalformedBundle(format!(
                    "unsupported content type {content_type}"
                )));
            }
        }
        let content = bundle
            .secret_bundle_content
            .content
            .ok_or_else(|| VaultError::MalformedBundle("bundle has no content".to_string()))?;

        Ok(SecretBundle {
            secret_id: bundle.secret_id.unwrap_or_else(|| secret_id.to_string()),
            version_number: bundle.version_number,
            content,
        })
    }
}
