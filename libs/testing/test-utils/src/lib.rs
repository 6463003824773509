//! Shared test utilities for the RAG crates
//!
//! - `TestRedisStack`: Redis Stack container (RediSearch included) with
//!   automatic cleanup (feature: "redis")
//! - `TestDataBuilder`: deterministic index names and embeddings (always available)
//!
//! # Redis Stack Testing
//!
//! Add `features = ["redis"]` to your dev-dependencies:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { workspace = true, features = ["redis"] }
//! ```
//!
//! ```rust,ignore
//! use test_utils::TestRedisStack;
//!
//! #[tokio::test]
//! #[ignore = "requires Docker"]
//! async fn my_redis_test() {
//!     let stack = TestRedisStack::new().await;
//!     let config = RedisConfig::new(stack.host(), stack.port());
//! }
//! ```

#[cfg(feature = "redis")]
mod redis_stack;

#[cfg(feature = "redis")]
pub use redis_stack::TestRedisStack;

/// Builder for test data with deterministic randomization
///
/// Tests sharing one backing store stay isolated by deriving their index
/// names from the test name.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Seed from a hash of the test name.
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("test_create_index");
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// `test-{prefix}-{seed}-{suffix}`
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::new(7);
    /// assert_eq!(builder.name("index", "docs"), "test-index-7-docs");
    /// ```
    pub fn name(&self, prefix: &str, suffix: &str) -> String {
        format!("test-{}-{}-{}", prefix, self.seed, suffix)
    }

    /// Index name unique to this builder's seed
    pub fn index_name(&self, suffix: &str) -> String {
        self.name("index", suffix)
    }

    /// Non-zero embedding of length `dim`, different for every `(seed, salt)`.
    ///
    /// Components lie in `[0.05, 1.0)` so cosine distance is always defined.
    pub fn embedding(&self, dim: usize, salt: u64) -> Vec<f64> {
        let mut state = self.seed ^ salt.wrapping_mul(0x9E37_79B9_7F4A_7C15);
        (0..dim)
            .map(|_| {
                // xorshift64
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                0.05 + (state % 950) as f64 / 1000.0
            })
            .collect()
    }
}
