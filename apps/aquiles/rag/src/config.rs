//! Persisted service configuration.
//!
//! Stored as pretty JSON at `$AQUILES_CONFIG`, or under the platform data
//! directory as `aquiles-AquilesRAG/aquiles_config.json`.

use std::fs;
use std::path::{Path, PathBuf};

use database::redis::{ConnectionMode, RedisConfig, TlsFiles};
use eyre::{Result, WrapErr, eyre};
use serde::{Deserialize, Serialize};

pub const CONFIG_ENV: &str = "AQUILES_CONFIG";
const DATA_DIR: &str = "aquiles-AquilesRAG";
const FILE_NAME: &str = "aquiles_config.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowedUser {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AquilesConfig {
    /// Self-managed Redis: plain or cluster, never TLS
    pub local: bool,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub cluster_mode: bool,
    pub tls_mode: bool,
    pub ssl_cert: String,
    pub ssl_key: String,
    pub ssl_ca: String,
    pub allows_api_keys: Vec<String>,
    pub allows_users: Vec<AllowedUser>,
}

impl Default for AquilesConfig {
    fn default() -> Self {
        Self {
            local: true,
            host: "localhost".to_string(),
            port: 6379,
            username: String::new(),
            password: String::new(),
            cluster_mode: false,
            tls_mode: false,
            ssl_cert: String::new(),
            ssl_key: String::new(),
            ssl_ca: String::new(),
            allows_api_keys: vec![String::new()],
            allows_users: vec![AllowedUser {
                username: "root".to_string(),
                password: "root".to_string(),
            }],
        }
    }
}

/// `$AQUILES_CONFIG` if set, else the file under the platform data directory.
pub fn config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        if !path.is_empty() {
            return Ok(PathBuf::from(path));
        }
    }

    let data_dir = dirs::data_dir()
        .ok_or_else(|| eyre!("No data directory on this platform; set {}", CONFIG_ENV))?;
    Ok(data_dir.join(DATA_DIR).join(FILE_NAME))
}

impl AquilesConfig {
    /// Reads `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&raw)
            .wrap_err_with(|| format!("Invalid configuration in {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .wrap_err_with(|| format!("Failed to create {}", parent.display()))?;
        }

        let body = serde_json::to_string_pretty(self)?;
        fs::write(path, body).wrap_err_with(|| format!("Failed to write {}", path.display()))
    }

    /// Writes the defaults if nothing is stored yet, then loads.
    pub fn init(path: &Path) -> Result<Self> {
        if !path.exists() {
            Self::default().save(path)?;
            tracing::info!(path = %path.display(), "Wrote default configuration");
        }
        Self::load(path)
    }

    /// Keys for the access gate; blank entries are placeholders, not keys.
    pub fn api_keys(&self) -> Vec<String> {
        self.allows_api_keys
            .iter()
            .filter(|key| !key.is_empty())
            .cloned()
            .collect()
    }

    /// Picks the connection mode.
    ///
    /// `local` with `cluster_mode` is a cluster; plain `local` is a single
    /// node; otherwise `tls_mode` means TLS and anything else a single node.
    /// `cluster_mode` is ignored without `local`, `tls_mode` with it.
    pub fn to_redis_config(&self) -> RedisConfig {
        let mode = match (self.local, self.cluster_mode, self.tls_mode) {
            (true, true, _) => ConnectionMode::Cluster,
            (true, false, _) => ConnectionMode::Single,
            (false, _, true) => ConnectionMode::Tls(TlsFiles {
                cert: non_empty_path(&self.ssl_cert),
                key: non_empty_path(&self.ssl_key),
                ca: non_empty_path(&self.ssl_ca),
            }),
            (false, _, false) => ConnectionMode::Single,
        };

        RedisConfig::new(self.host.as_str(), self.port)
            .with_auth(Some(self.username.clone()), Some(self.password.clone()))
            .with_mode(mode)
    }
}

fn non_empty_path(value: &str) -> Option<PathBuf> {
    (!value.is_empty()).then(|| PathBuf::from(value))
}
