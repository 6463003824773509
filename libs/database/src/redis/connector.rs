use std::path::Path;

use redis::Client;
use redis::aio::ConnectionManager;
use redis::cluster::ClusterClient;
use redis::{ClientTlsConfig, TlsCertificates};
use tracing::{debug, info};

use super::config::{ConnectionMode, RedisConfig, TlsFiles};
use super::handle::RedisHandle;
use super::health::check_health;
use crate::common::{DatabaseError, DatabaseResult, RetryConfig, retry, retry_with_backoff};

/// Open the backing-store handle described by `config` and verify it with PING.
pub async fn connect(config: &RedisConfig) -> DatabaseResult<RedisHandle> {
    info!(url = %config.redacted_url(), mode = ?config.mode, "Connecting to Redis");

    let mut handle = match &config.mode {
        ConnectionMode::Single => {
            let client = Client::open(config.url())?;
            RedisHandle::Single(ConnectionManager::new(client).await?)
        }
        ConnectionMode::Tls(files) => {
            let client = tls_client(config, files)?;
            RedisHandle::Single(ConnectionManager::new(client).await?)
        }
        ConnectionMode::Cluster => {
            let client = ClusterClient::new(vec![config.url()])?;
            RedisHandle::Cluster(client.get_async_connection().await?)
        }
    };

    check_health(&mut handle).await?;

    info!(cluster = handle.is_cluster(), "Successfully connected to Redis");
    Ok(handle)
}

/// [`connect`] with exponential backoff; `None` uses the default policy.
pub async fn connect_with_retry(
    config: &RedisConfig,
    retry_config: Option<RetryConfig>,
) -> DatabaseResult<RedisHandle> {
    match retry_config {
        Some(policy) => retry_with_backoff(|| connect(config), policy).await,
        None => retry(|| connect(config)).await,
    }
}

fn tls_client(config: &RedisConfig, files: &TlsFiles) -> DatabaseResult<Client> {
    if files.is_empty() {
        debug!("TLS without client material, relying on system roots");
        return Ok(Client::open(config.url())?);
    }

    let client_tls = match (&files.cert, &files.key) {
        (Some(cert), Some(key)) => Some(ClientTlsConfig {
            client_cert: read_material(cert)?,
            client_key: read_material(key)?,
        }),
        (None, None) => None,
        _ => {
            return Err(DatabaseError::ConfigError(
                "TLS client certificate and key must be provided together".to_string(),
            ));
        }
    };

    let root_cert = files.ca.as_deref().map(read_material).transpose()?;

    Ok(Client::build_with_tls(
        config.url(),
        TlsCertificates {
            client_tls,
            root_cert,
        },
    )?)
}

/// Relative paths resolve against the working directory.
fn read_material(path: &Path) -> DatabaseResult<Vec<u8>> {
    std::fs::read(path).map_err(|source| DatabaseError::TlsMaterial {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_tls_requires_cert_and_key_together() {
        let files = TlsFiles {
            cert: Some(PathBuf::from("client.crt")),
            key: None,
            ca: None,
        };
        let config = RedisConfig::new("h", 6380).with_mode(ConnectionMode::Tls(files.clone()));

        let err = tls_client(&config, &files).unwrap_err();
        assert!(matches!(err, DatabaseError::ConfigError(_)));
    }

    #[test]
    fn test_missing_tls_material_reports_path() {
        let files = TlsFiles {
            cert: None,
            key: None,
            ca: Some(PathBuf::from("/nonexistent/aquiles/ca.pem")),
        };
        let config = RedisConfig::new("h", 6380).with_mode(ConnectionMode::Tls(files.clone()));

        let err = tls_client(&config, &files).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/aquiles/ca.pem"));
    }

    #[tokio::test]
    #[ignore] // Requires actual Redis
    async fn test_connect_local() {
        let handle = connect(&RedisConfig::default()).await;
        assert!(handle.is_ok());
    }
}
