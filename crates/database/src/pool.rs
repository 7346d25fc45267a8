use deadpool_postgres::{
    Config, ManagerConfig, Pool, PoolConfig, RecyclingMethod, Runtime, Timeouts,
};
use secrecy::{ExposeSecret, SecretString};
use services::DbCredentials;
use tokio_postgres::NoTls;
use tracing::info;

/// Upper bound on simultaneously leased connections
pub const POOL_MAX_SIZE: usize = 5;

/// Connection pool type alias
pub type DbPool = Pool;

/// libpq key/value connection string built from resolved credentials.
///
/// `Display` masks the password; only [`ConnectionString::expose`] returns
/// the text handed to the driver.
pub struct ConnectionString {
    host: String,
    port: u16,
    dbname: String,
    user: String,
    password: SecretString,
}

impl ConnectionString {
    pub fn from_credentials(credentials: &DbCredentials) -> Self {
        Self {
            host: credentials.host.clone(),
            port: credentials.port,
            dbname: credentials.dbname.clone(),
            user: credentials.username.clone(),
            password: SecretString::from(credentials.password.expose_secret().to_string()),
        }
    }

    fn render(&self, password: &str) -> String {
        format!(
            "host={} port={} dbname={} user={} password={}",
            quote(&self.host),
            self.port,
            quote(&self.dbname),
            quote(&self.user),
            quote(password)
        )
    }

    pub fn expose(&self) -> String {
        self.render(self.password.expose_secret())
    }

    pub fn redacted(&self) -> String {
        format!(
            "host={} port={} dbname={} user={} password=***",
            quote(&self.host),
            self.port,
            quote(&self.dbname),
            quote(&self.user)
        )
    }
}

impl std::fmt::Display for ConnectionString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.redacted())
    }
}

impl std::fmt::Debug for ConnectionString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ConnectionString")
            .field(&self.redacted())
            .finish()
    }
}

/// Single-quote a conninfo value, escaping `\` and `'`.
fn quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{escaped}'")
}

/// Build a bounded, lazily connecting pool. No connection is attempted here.
pub fn create_pool(
    credentials: &DbCredentials,
    timeouts: &config::PoolTimeouts,
) -> anyhow::Result<DbPool> {
    let connection_string = ConnectionString::from_credentials(credentials);
    info!(
        "Creating database pool: {} (max_size={})",
        connection_string, POOL_MAX_SIZE
    );

    let mut cfg = Config::new();
    cfg.url = Some(connection_string.expose());
    cfg.connect_timeout = Some(timeouts.connect);
    cfg.manager = Some(ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    });

    let mut pool_config = PoolConfig::new(POOL_MAX_SIZE);
    pool_config.timeouts = Timeouts {
        wait: Some(timeouts.wait),
        create: Some(timeouts.connect),
        recycle: Some(timeouts.connect),
    };
    cfg.pool = Some(pool_config);

    cfg.create_pool(Some(Runtime::Tokio1), NoTls)
        .map_err(|e| anyhow::anyhow!("Failed to create database pool: {e}"))
}
