//! Raw TCP reachability probe for the downstream database.

use std::time::Duration;

use tokio::net::TcpStream;

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("FAILURE: Connection to {host}:{port} timed out after {} seconds. The network path is blocked.", .timeout.as_secs())]
    Timeout {
        host: String,
        port: u16,
        timeout: Duration,
    },
    #[error("FAILURE: An unexpected error occurred while connecting to {host}:{port}: {source}")]
    Connect {
        host: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },
}

/// Open and immediately drop one TCP connection to `target`.
pub async fn probe_tcp(target: &ProbeTarget, timeout: Duration) -> Result<String, ProbeError> {
    let ProbeTarget { host, port } = target;
    tracing::info!(
        "Attempting raw socket connection to {}:{} with a {}s timeout",
        host,
        port,
        timeout.as_secs()
    );

    match tokio::time::timeout(timeout, TcpStream::connect((host.as_str(), *port))).await {
        Ok(Ok(_stream)) => {
            let message = format!("SUCCESS: Raw TCP connection to {host}:{port} was established.");
            tracing::info!("{}", message);
            Ok(message)
        }
        Ok(Err(source)) => Err(ProbeError::Connect {
            host: host.clone(),
            port: *port,
            source,
        }),
        Err(_) => Err(ProbeError::Timeout {
            host: host.clone(),
            port: *port,
            timeout,
        }),
    }
}
