//! Sync run bookkeeping and retry policy.

mod retry_policy;
mod sync_log_model;
mod sync_log_traits;

pub use retry_policy::*;
pub use sync_log_model::*;
pub use sync_log_traits::*;
