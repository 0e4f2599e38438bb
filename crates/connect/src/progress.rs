//! Progress callbacks emitted while a catalog sync runs.

use serde::Serialize;

use crate::orchestrator::SyncResult;

/// Snapshot emitted after each page has been processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncProgressPayload {
    pub store_code: String,
    pub log_id: String,
    pub page: usize,
    pub total_records: i64,
    pub processed_records: i64,
    pub failed_records: i64,
}

/// Receives lifecycle events from [`crate::ProductSyncOrchestrator`].
pub trait SyncProgressReporter: Send + Sync {
    fn report_sync_start(&self, store_code: &str, log_id: &str);

    fn report_progress(&self, payload: SyncProgressPayload);

    fn report_sync_complete(&self, result: &SyncResult);
}

/// Reporter that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpProgressReporter;

impl SyncProgressReporter for NoOpProgressReporter {
    fn report_sync_start(&self, _store_code: &str, _log_id: &str) {}

    fn report_progress(&self, _payload: SyncProgressPayload) {}

    fn report_sync_complete(&self, _result: &SyncResult) {}
}
