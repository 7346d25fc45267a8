use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

pub const OCI_USER_OCID: &str = "OCI_USER_OCID";
pub const OCI_FINGERPRINT: &str = "OCI_FINGERPRINT";
pub const OCI_TENANCY_OCID: &str = "OCI_TENANCY_OCID";
pub const OCI_REGION: &str = "OCI_REGION";
pub const OCI_PRIVATE_KEY_CONTENT: &str = "OCI_PRIVATE_KEY_CONTENT";
pub const DB_SECRET_OCID: &str = "DB_SECRET_OCID";
pub const VM_SECRET_OCID: &str = "VM_SECRET_OCID";

/// Variables the item inserter cannot start without.
pub const ITEM_SERVICE_REQUIRED_VARS: &[&str] = &[
    OCI_USER_OCID,
    OCI_FINGERPRINT,
    OCI_TENANCY_OCID,
    OCI_REGION,
    OCI_PRIVATE_KEY_CONTENT,
    DB_SECRET_OCID,
];

/// Variables the VM writer cannot start without. Its vault identity comes from
/// the platform, so only the secret id is required here.
pub const VM_WRITER_REQUIRED_VARS: &[&str] = &[VM_SECRET_OCID];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing critical configuration: {}", .0.join(", "))]
    MissingKeys(Vec<String>),
}

/// Values read for a fixed set of required keys.
///
/// Construction only succeeds when every key is present and non-empty, so
/// downstream code can index it without re-checking.
#[derive(Clone, Default)]
pub struct RawConfig {
    values: BTreeMap<String, String>,
}

impl RawConfig {
    /// Read `keys` from the process environment.
    pub fn from_env(keys: &[&str]) -> Result<Self, ConfigError> {
        Self::from_lookup(keys, |key| std::env::var(key).ok())
    }

    /// Read `keys` through `lookup`. All missing or blank keys are reported
    /// together rather than failing on the first one.
    pub fn from_lookup<F>(keys: &[&str], lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut values = BTreeMap::new();
        let mut missing = Vec::new();

        for key in keys {
            match lookup(key) {
                Some(value) if !value.trim().is_empty() => {
                    values.insert((*key).to_string(), value);
                }
                _ => missing.push((*key).to_string()),
            }
        }

        if !missing.is_empty() {
            return Err(ConfigError::MissingKeys(missing));
        }

        Ok(Self { values })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    fn take(&self, key: &str) -> Result<String, ConfigError> {
        self.get(key)
            .map(str::to_string)
            .ok_or_else(|| ConfigError::MissingKeys(vec![key.to_string()]))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

// Values may carry key material, so only key names are printed
impl std::fmt::Debug for RawConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.values.keys()).finish()
    }
}

/// API-key identity used by the item inserter to reach the vault
#[derive(Clone)]
pub struct OciApiKeyConfig {
    pub user_ocid: String,
    pub fingerprint: String,
    pub tenancy_ocid: String,
    pub region: String,
    /// Private key as stored in the environment, with or without PEM armor
    pub private_key_content: String,
}

impl std::fmt::Debug for OciApiKeyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OciApiKeyConfig")
            .field("user_ocid", &self.user_ocid)
            .field("fingerprint", &self.fingerprint)
            .field("tenancy_ocid", &self.tenancy_ocid)
            .field("region", &self.region)
            .field("private_key_content", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ItemServiceConfig {
    pub oci: OciApiKeyConfig,
    pub db_secret_ocid: String,
}

impl ItemServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_raw(&RawConfig::from_env(ITEM_SERVICE_REQUIRED_VARS)?)
    }

    pub fn from_raw(raw: &RawConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            oci: OciApiKeyConfig {
                user_ocid: raw.take(OCI_USER_OCID)?,
                fingerprint: raw.take(OCI_FINGERPRINT)?,
                tenancy_ocid: raw.take(OCI_TENANCY_OCID)?,
                region: raw.take(OCI_REGION)?,
                private_key_content: raw.take(OCI_PRIVATE_KEY_CONTENT)?,
            },
            db_secret_ocid: raw.take(DB_SECRET_OCID)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct VmWriterConfig {
    pub vm_secret_ocid: String,
    /// Expected SHA256 fingerprint of the VM host key. When unset any host key
    /// is accepted.
    pub host_key_fingerprint: Option<String>,
}

impl VmWriterConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_raw(&RawConfig::from_env(VM_WRITER_REQUIRED_VARS)?)
    }

    pub fn from_raw(raw: &RawConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            vm_secret_ocid: raw.take(VM_SECRET_OCID)?,
            host_key_fingerprint: std::env::var("VM_HOST_KEY_FINGERPRINT")
                .ok()
                .filter(|v| !v.trim().is_empty()),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VaultConfig {
    /// Overrides the regional secrets endpoint
    pub endpoint: Option<String>,
    pub timeout: Duration,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            endpoint: std::env::var("VAULT_ENDPOINT")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            timeout: Duration::from_secs(env_secs("VAULT_TIMEOUT_SECS", 30)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoolTimeouts {
    /// How long a request waits for a free pooled connection
    pub wait: Duration,
    /// How long opening a new downstream connection may take
    pub connect: Duration,
}

impl Default for PoolTimeouts {
    fn default() -> Self {
        Self {
            wait: Duration::from_secs(env_secs("DB_POOL_WAIT_TIMEOUT_SECS", 10)),
            connect: Duration::from_secs(env_secs("DB_CONNECT_TIMEOUT_SECS", 10)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SshConfig {
    /// Upper bound for connect, authenticate and transfer together
    pub timeout: Duration,
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(env_secs("SSH_TIMEOUT_SECS", 30)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Global log level: "error", "warn", "info", "debug" or "trace".
    /// Default: "info" (from LOG_LEVEL).
    pub level: String,
    /// Output format: "json" or "pretty". Default: "json" (from LOG_FORMAT).
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string()),
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        !self.format.eq_ignore_ascii_case("pretty")
    }
}

fn env_secs(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Settings shared by both binaries that never block startup
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub vault: VaultConfig,
    pub pool: PoolTimeouts,
    pub ssh: SshConfig,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            vault: VaultConfig::default(),
            pool: PoolTimeouts::default(),
            ssh: SshConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn full_item_env() -> Vec<(&'static str, &'static str)> {
        vec![
            (OCI_USER_OCID, "ocid1.user.oc1..aaaa"),
            (OCI_FINGERPRINT, "aa:bb:cc:dd:ee:ff:00:11:22:33:44:55:66:77:88:99"),
            (OCI_TENANCY_OCID, "ocid1.tenancy.oc1..bbbb"),
            (OCI_REGION, "eu-frankfurt-1"),
            (OCI_PRIVATE_KEY_CONTENT, "MIIEow"),
            (DB_SECRET_OCID, "ocid1.vaultsecret.oc1..cccc"),
        ]
    }

    #[test]
    fn test_all_keys_present() {
        let raw = RawConfig::from_lookup(ITEM_SERVICE_REQUIRED_VARS, lookup_from(&full_item_env()))
            .unwrap();
        assert_eq!(raw.get(OCI_REGION), Some("eu-frankfurt-1"));
        assert_eq!(raw.keys().count(), ITEM_SERVICE_REQUIRED_VARS.len());
    }

    #[test]
    fn test_each_missing_key_is_named() {
        for key in ITEM_SERVICE_REQUIRED_VARS {
            let env: Vec<_> = full_item_env()
                .into_iter()
                .filter(|(k, _)| k != key)
                .collect();
            let err = RawConfig::from_lookup(ITEM_SERVICE_REQUIRED_VARS, lookup_from(&env))
                .unwrap_err();
            assert_eq!(err, ConfigError::MissingKeys(vec![key.to_string()]));
            assert!(err.to_string().contains(key));
        }
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let mut env = full_item_env();
        env.retain(|(k, _)| *k != OCI_FINGERPRINT);
        env.push((OCI_FINGERPRINT, "   "));
        let err =
            RawConfig::from_lookup(ITEM_SERVICE_REQUIRED_VARS, lookup_from(&env)).unwrap_err();
        assert_eq!(err, ConfigError::MissingKeys(vec![OCI_FINGERPRINT.to_string()]));
    }

    #[test]
    fn test_missing_keys_are_aggregated() {
        let err = RawConfig::from_lookup(ITEM_SERVICE_REQUIRED_VARS, lookup_from(&[])).unwrap_err();
        let ConfigError::MissingKeys(keys) = &err;
        assert_eq!(keys.len(), ITEM_SERVICE_REQUIRED_VARS.len());
        assert!(err
            .to_string()
            .starts_with("Missing critical configuration: OCI_USER_OCID, OCI_FINGERPRINT"));
    }

    #[test]
    fn test_debug_hides_values() {
        let raw = RawConfig::from_lookup(ITEM_SERVICE_REQUIRED_VARS, lookup_from(&full_item_env()))
            .unwrap();
        let printed = format!("{raw:?}");
        assert!(printed.contains(OCI_PRIVATE_KEY_CONTENT));
        assert!(!printed.contains("MIIEow"));

        let config = ItemServiceConfig::from_raw(&raw).unwrap();
        let printed = format!("{config:?}");
        assert!(printed.contains("[REDACTED]"));
        assert!(!printed.contains("MIIEow"));
    }

    #[test]
    #[serial_test::serial]
    fn test_vm_writer_config_from_env() {
        std::env::set_var(VM_SECRET_OCID, "ocid1.vaultsecret.oc1..vm");
        std::env::remove_var("VM_HOST_KEY_FINGERPRINT");
        let config = VmWriterConfig::from_env().unwrap();
        assert_eq!(config.vm_secret_ocid, "ocid1.vaultsecret.oc1..vm");
        assert!(config.host_key_fingerprint.is_none());

        std::env::remove_var(VM_SECRET_OCID);
        let err = VmWriterConfig::from_env().unwrap_err();
        assert_eq!(err.to_string(), "Missing critical configuration: VM_SECRET_OCID");
    }

    #[test]
    fn test_logging_format() {
        let pretty = LoggingConfig {
            level: "info".into(),
            format: "Pretty".into(),
        };
        assert!(!pretty.is_json());
        let json = LoggingConfig {
            level: "info".into(),
            format: "json".into(),
        };
        assert!(json.is_json());
    }
}
