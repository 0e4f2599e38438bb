//! SQLite storage for the Faire catalog mirror.
//!
//! Reads go through an r2d2 pool; writes go through a single writer thread
//! (see [`db::write_actor`]) so each repository mutation runs in one
//! transaction.

pub mod db;
pub mod errors;
pub mod products;
pub mod schema;
pub mod stores;
pub mod sync;

pub use db::{create_pool, get_connection, init, run_migrations, write_actor::spawn_writer};
pub use db::WriteHandle;
pub use errors::StorageError;
pub use products::ProductRepository;
pub use stores::StoreRepository;
pub use sync::SyncLogRepository;
