//! Inbound HTTP handlers.

pub mod card;
