//! Stores that own a Faire catalog mirror.

mod store_model;
mod store_traits;

pub use store_model::*;
pub use store_traits::*;
