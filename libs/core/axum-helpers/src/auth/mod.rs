//! Access gating.
//!
//! The only scheme is a static shared secret carried in the `x-api-key`
//! header and checked against a configured allow-list. An empty allow-list
//! switches the gate off.

mod api_key;

pub use api_key::{API_KEY_HEADER, ApiKeyGate, GateError, api_key_middleware};
