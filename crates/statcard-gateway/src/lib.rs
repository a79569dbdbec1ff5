//! statcard gateway library entry.
//!
//! Wires config, upstream fetchers, the star store, the aggregator and the
//! HTTP handlers into one axum service. Consumed by the binary (`main.rs`)
//! and by integration tests.

pub mod aggregate;
pub mod app_state;
pub mod config;
pub mod infra;
pub mod obs;
pub mod ops;
pub mod router;
pub mod transport;
pub mod upstream;
