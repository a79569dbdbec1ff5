//! Process-local infrastructure: the highest-stars store and per-key locks.

pub mod keyed_locks;
pub mod stars_store;

pub use keyed_locks::KeyedLocks;
pub use stars_store::{parse_seed_vars, HighestStarsStore, InMemoryStarsStore};
