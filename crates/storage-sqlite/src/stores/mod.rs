//! SQLite storage implementation for stores.

mod model;
mod repository;

pub use model::StoreDB;
pub use repository::StoreRepository;
