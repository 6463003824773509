use clap::{Args, Parser, Subcommand};

use crate::config::AquilesConfig;

#[derive(Parser)]
#[command(name = "aquiles-rag")]
#[command(about = "Vector-indexed chunk storage and retrieval on Redis Stack")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Bind address (default: HOST or 0.0.0.0)
        #[arg(long)]
        host: Option<String>,

        /// Bind port (default: PORT or 5500)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Update the persisted configuration; omitted options keep their value
    Configs(ConfigsArgs),
}

#[derive(Args, Debug, Default)]
pub struct ConfigsArgs {
    /// Connect to Redis on localhost
    #[arg(long, overrides_with = "no_local")]
    pub local: bool,
    #[arg(long, overrides_with = "local")]
    pub no_local: bool,

    /// Redis host
    #[arg(long)]
    pub host: Option<String>,

    /// Redis port
    #[arg(long)]
    pub port: Option<u16>,

    #[arg(long)]
    pub username: Option<String>,

    #[arg(long)]
    pub password: Option<String>,

    /// Connect to a Redis Cluster
    #[arg(long, overrides_with = "no_cluster_mode")]
    pub cluster_mode: bool,
    #[arg(long, overrides_with = "cluster_mode")]
    pub no_cluster_mode: bool,

    /// Connect over TLS (rediss://)
    #[arg(long, overrides_with = "no_tls_mode")]
    pub tls_mode: bool,
    #[arg(long, overrides_with = "tls_mode")]
    pub no_tls_mode: bool,

    /// Client certificate (PEM)
    #[arg(long)]
    pub ssl_cert: Option<String>,

    /// Client private key (PEM)
    #[arg(long)]
    pub ssl_key: Option<String>,

    /// CA certificate (PEM)
    #[arg(long)]
    pub ssl_ca: Option<String>,

    /// Add a key to the API allow-list (repeatable)
    #[arg(long = "add-api-key")]
    pub add_api_keys: Vec<String>,
}

/// `--flag` / `--no-flag` pair; neither given means unchanged.
fn switch(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (false, true) => Some(false),
        (false, false) => None,
    }
}

impl ConfigsArgs {
    pub fn apply(self, config: &mut AquilesConfig) {
        if let Some(local) = switch(self.local, self.no_local) {
            config.local = local;
        }
        if let Some(cluster_mode) = switch(self.cluster_mode, self.no_cluster_mode) {
            config.cluster_mode = cluster_mode;
        }
        if let Some(tls_mode) = switch(self.tls_mode, self.no_tls_mode) {
            config.tls_mode = tls_mode;
        }

        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(username) = self.username {
            config.username = username;
        }
        if let Some(password) = self.password {
            config.password = password;
        }
        if let Some(ssl_cert) = self.ssl_cert {
            config.ssl_cert = ssl_cert;
        }
        if let Some(ssl_key) = self.ssl_key {
            config.ssl_key = ssl_key;
        }
        if let Some(ssl_ca) = self.ssl_ca {
            config.ssl_ca = ssl_ca;
        }

        for key in self.add_api_keys {
            if !key.is_empty() && !config.allows_api_keys.contains(&key) {
                config.allows_api_keys.push(key);
            }
        }
    }
}
