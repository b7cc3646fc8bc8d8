//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - reqwest HTTP client for the content API
//! - In-memory store for tests and offline demos

pub mod http;
pub mod memory;

#[cfg(test)]
pub mod http_mock;
