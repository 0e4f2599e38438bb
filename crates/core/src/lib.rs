//! Domain layer for mirroring a Faire product catalog into a local store.
//!
//! This crate holds the models, repository contracts and policy helpers shared
//! by the storage backend and the Faire connector. It has no I/O of its own.

pub mod errors;
pub mod products;
pub mod stores;
pub mod sync;

pub use errors::{DatabaseError, Error, Result};
