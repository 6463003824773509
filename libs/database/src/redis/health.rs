use std::time::Instant;

use redis::aio::ConnectionLike;
use tracing::debug;

use crate::common::DatabaseError;

/// PING the backing store; anything but `PONG` is a failure.
pub async fn check_health<C>(conn: &mut C) -> Result<(), DatabaseError>
where
    C: ConnectionLike + Send,
{
    let response: String = redis::cmd("PING").query_async(conn).await.map_err(|e| {
        DatabaseError::HealthCheckFailed(format!("Redis health check failed: {}", e))
    })?;

    if response != "PONG" {
        return Err(DatabaseError::HealthCheckFailed(format!(
            "Redis PING returned unexpected response: {}",
            response
        )));
    }

    debug!("Redis health check passed");
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct HealthStatus {
    pub healthy: bool,
    pub message: Option<String>,
    pub response_time_ms: u64,
}

impl HealthStatus {
    pub fn healthy(response_time_ms: u64) -> Self {
        Self {
            healthy: true,
            message: None,
            response_time_ms,
        }
    }

    pub fn unhealthy(message: String, response_time_ms: u64) -> Self {
        Self {
            healthy: false,
            message: Some(message),
            response_time_ms,
        }
    }
}

/// Timed variant of [`check_health`] for readiness reporting
pub async fn check_health_detailed<C>(conn: &mut C) -> HealthStatus
where
    C: ConnectionLike + Send,
{
    let start = Instant::now();
    let result = check_health(conn).await;
    let elapsed = start.elapsed().as_millis() as u64;

    match result {
        Ok(_) => HealthStatus::healthy(elapsed),
        Err(e) => HealthStatus::unhealthy(e.to_string(), elapsed),
    }
}
