//! Redis Stack test infrastructure
//!
//! Plain Redis has no `FT.*` commands, so vector tests run against the
//! `redis/redis-stack-server` image.

use redis::Client;
use testcontainers::core::{IntoContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage};

const IMAGE: &str = "redis/redis-stack-server";
const TAG: &str = "7.4.0-v3";

/// Redis Stack container, stopped and removed on drop.
///
/// ```no_run
/// use test_utils::TestRedisStack;
///
/// # async fn example() {
/// let stack = TestRedisStack::new().await;
/// let client = stack.client();
/// # }
/// ```
pub struct TestRedisStack {
    #[allow(dead_code)]
    container: ContainerAsync<GenericImage>,
    host: String,
    port: u16,
}

impl TestRedisStack {
    pub async fn new() -> Self {
        let container = GenericImage::new(IMAGE, TAG)
            .with_exposed_port(6379.tcp())
            .with_wait_for(WaitFor::message_on_stdout("Ready to accept connections"))
            .start()
            .await
            .expect("Failed to start Redis Stack container");

        let port = container
            .get_host_port_ipv4(6379)
            .await
            .expect("Failed to get Redis Stack port");

        tracing::info!(port, "Test Redis Stack ready ({}:{})", IMAGE, TAG);

        Self {
            container,
            host: "127.0.0.1".to_string(),
            port,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn connection_string(&self) -> String {
        format!("redis://{}:{}", self.host, self.port)
    }

    pub fn client(&self) -> Client {
        Client::open(self.connection_string()).expect("Failed to create Redis client")
    }
}

impl Drop for TestRedisStack {
    fn drop(&mut self) {
        tracing::debug!("Cleaning up test Redis Stack container");
    }
}
