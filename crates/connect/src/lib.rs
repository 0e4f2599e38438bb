//! Faire connector: API client, record mapping and the product sync routine.
//!
//! # Example
//!
//! ```ignore
//! use faire_sync_connect::{FaireApiClient, ProductSyncOrchestrator, NoOpProgressReporter};
//!
//! let client = Arc::new(FaireApiClient::new(DEFAULT_FAIRE_API_URL)?);
//! let orchestrator = ProductSyncOrchestrator::new(
//!     stores, products, sync_logs, client, Arc::new(NoOpProgressReporter),
//! );
//! let result = orchestrator.run_sync("toyarina").await?;
//! ```

pub mod client;
pub mod error;
pub mod mapping;
pub mod orchestrator;
pub mod progress;
pub mod types;

pub use client::{FaireApiClient, FaireCatalogApi, DEFAULT_FAIRE_API_URL};
pub use error::{ConnectError, Result};
pub use mapping::map_product;
pub use orchestrator::{
    EnvLookup, ProductSyncOrchestrator, RecordFailure, RecordOutcome, SyncConfig, SyncResult,
};
pub use progress::{NoOpProgressReporter, SyncProgressPayload, SyncProgressReporter};
pub use types::*;
