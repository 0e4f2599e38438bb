use std::sync::Arc;

use faire_sync_connect::{
    FaireApiClient, ProductSyncOrchestrator, SyncProgressPayload, SyncProgressReporter,
    SyncResult,
};
use tracing::{error, info};

use crate::config::AppConfig;
use crate::context::ServiceContext;

/// Writes orchestrator events to the tracing log.
struct TracingProgressReporter;

impl SyncProgressReporter for TracingProgressReporter {
    fn report_sync_start(&self, store_code: &str, log_id: &str) {
        info!(store = store_code, log_id, "Product sync started");
    }

    fn report_progress(&self, payload: SyncProgressPayload) {
        info!(
            store = %payload.store_code,
            page = payload.page,
            processed = payload.processed_records,
            failed = payload.failed_records,
            "Page processed"
        );
    }

    fn report_sync_complete(&self, result: &SyncResult) {
        if result.success {
            info!(
                store = %result.store_code,
                log_id = %result.log_id,
                pages = result.pages_fetched,
                duration_ms = result.duration_ms,
                "{}",
                result.message
            );
        } else {
            error!(
                store = %result.store_code,
                log_id = %result.log_id,
                "Product sync failed: {}",
                result.message
            );
        }
    }
}

/// Runs one product sync and prints its summary.
pub async fn run(
    ctx: &ServiceContext,
    config: &AppConfig,
    store_code: &str,
) -> anyhow::Result<SyncResult> {
    let client = FaireApiClient::new(&config.api_url)?;
    let orchestrator = ProductSyncOrchestrator::new(
        ctx.store_repository.clone(),
        ctx.product_repository.clone(),
        ctx.sync_log_repository.clone(),
        Arc::new(client),
        Arc::new(TracingProgressReporter),
    )
    .with_config(config.sync);

    let result = orchestrator.run_sync(store_code).await?;

    println!(
        "{} [{}] store={} pages={} total={} processed={} failed={} ({} ms)",
        if result.success { "OK" } else { "FAILED" },
        result.log_id,
        result.store_code,
        result.pages_fetched,
        result.counts.total_records,
        result.counts.processed_records,
        result.counts.failed_records,
        result.duration_ms
    );
    if !result.success {
        println!("  error: {}", result.message);
    }

    Ok(result)
}
