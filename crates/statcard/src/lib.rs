//! Top-level facade crate for statcard.
//!
//! Re-exports core types and the gateway library so users can depend on a single crate.

pub mod core {
    pub use statcard_core::*;
}

pub mod gateway {
    pub use statcard_gateway::*;
}
