//! Backing-store connectivity for Aquiles.
//!
//! The service keeps exactly one Redis handle for its whole lifetime: a
//! single-node [`redis::aio::ConnectionManager`], a cluster connection, or a
//! TLS connection, chosen from [`redis::RedisConfig`]. The handle is opened
//! once by the composition root and cloned into every component.
//!
//! ```ignore
//! use database::redis::{RedisConfig, connect_with_retry};
//!
//! let config = RedisConfig::new("localhost", 6379);
//! let handle = connect_with_retry(&config, None).await?;
//! ```

pub mod common;
pub mod redis;

pub use common::{DatabaseError, DatabaseResult};
