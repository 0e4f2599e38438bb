//! SQLite storage implementation for mirrored Faire products and variants.

mod model;
mod repository;

pub use model::{ProductDB, ProductVariantDB};
pub use repository::ProductRepository;
