use async_trait::async_trait;

use super::{NewSyncLog, SyncCounts, SyncLog};
use crate::errors::Result;

#[async_trait]
pub trait SyncLogRepositoryTrait: Send + Sync {
    /// Creates an `in_progress` log row stamped with the current time.
    async fn create_sync_log(&self, new_log: NewSyncLog) -> Result<SyncLog>;

    /// Moves an `in_progress` log to `completed`.
    ///
    /// Fails without changing anything if the log already reached a terminal
    /// status, so each run records exactly one outcome.
    async fn complete_sync_log(
        &self,
        log_id: &str,
        counts: SyncCounts,
        summary: Option<String>,
    ) -> Result<SyncLog>;

    /// Moves an `in_progress` log to `failed`. Same single-transition rule as
    /// [`SyncLogRepositoryTrait::complete_sync_log`].
    async fn fail_sync_log(
        &self,
        log_id: &str,
        counts: SyncCounts,
        error_message: String,
    ) -> Result<SyncLog>;

    fn get_sync_log(&self, log_id: &str) -> Result<Option<SyncLog>>;

    /// Most recent logs first.
    fn list_sync_logs(&self, store_id: Option<&str>, limit: i64) -> Result<Vec<SyncLog>>;
}
