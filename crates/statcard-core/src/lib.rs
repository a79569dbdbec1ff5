//! statcard core: runtime-free primitives shared by the gateway.
//!
//! This crate holds the data model of a stats card, the star reconciliation
//! policy, the contribution window arithmetic and the SVG renderer. It carries
//! no HTTP or async runtime dependencies so every piece here is a plain,
//! deterministic function that can be tested in isolation.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod key;
pub mod reconcile;
pub mod render;
pub mod snapshot;
pub mod window;

/// Shared result type.
pub use error::{Result, StatCardError};
pub use key::{composite_key, is_valid_login, normalize_key};
pub use reconcile::{reconcile, Decision, Reconciled};
pub use render::{render_card, CardText};
pub use snapshot::{ContributionTotals, MetricsSnapshot};
pub use window::ContributionWindow;
