//! API module
//!
//! HTTP client for the lead backend.

mod client;

pub use client::LeadClient;

#[cfg(test)]
pub use client::test_support;
