use faire_sync_core::sync::SyncLogRepositoryTrait;

use super::or_dash;
use crate::context::ServiceContext;

/// Prints recent sync runs, newest first.
pub fn run(ctx: &ServiceContext, store_code: Option<&str>, limit: i64) -> anyhow::Result<()> {
    let store_id = match store_code {
        Some(code) => Some(ctx.require_store(code)?.id),
        None => None,
    };

    let logs = ctx
        .sync_log_repository
        .list_sync_logs(store_id.as_deref(), limit)?;
    if logs.is_empty() {
        println!("No sync runs recorded.");
        return Ok(());
    }

    for log in logs {
        let duration = log
            .duration_ms()
            .map(|ms| format!("{} ms", ms))
            .unwrap_or_else(|| "running".to_string());
        println!(
            "{}  {:<11}  {}  {:>9}  total={} processed={} failed={}  {}",
            log.id,
            log.status.as_str(),
            log.started_at.format("%Y-%m-%d %H:%M:%S"),
            duration,
            log.total_records,
            log.processed_records,
            log.failed_records,
            or_dash(log.error_message.as_deref())
        );
    }
    Ok(())
}
