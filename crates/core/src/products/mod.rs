//! Local mirror rows for Faire products and their variants.

mod product_model;
mod product_traits;

pub use product_model::*;
pub use product_traits::*;
