//! Redis backing-store connection: configuration, topology-agnostic handle,
//! connect with retry, and PING health checks.

mod config;
mod connector;
mod handle;
mod health;

pub use config::{ConnectionMode, RedisConfig, TlsFiles};
pub use connector::{connect, connect_with_retry};
pub use handle::RedisHandle;
pub use health::{HealthStatus, check_health, check_health_detailed};

pub use redis::aio::ConnectionManager;
pub use redis::{AsyncCommands, RedisError, RedisResult};
