//! Repository for sync run logs.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use log::warn;
use uuid::Uuid;

use faire_sync_core::errors::{Error, Result};
use faire_sync_core::sync::{
    NewSyncLog, SyncCounts, SyncLog, SyncLogRepositoryTrait, SyncStatus,
};

use super::model::SyncLogDB;
use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::schema::sync_logs;

/// Maximum stored length of an error message or summary.
const MAX_ERROR_MESSAGE_CHARS: usize = 2_000;

fn truncate_message(message: String) -> String {
    if message.chars().count() <= MAX_ERROR_MESSAGE_CHARS {
        return message;
    }
    let mut truncated = message
        .chars()
        .take(MAX_ERROR_MESSAGE_CHARS)
        .collect::<String>();
    truncated.push_str("...");
    truncated
}

/// Applies the single allowed terminal transition for a log row.
fn finalize_tx(
    conn: &mut SqliteConnection,
    log_id: &str,
    status: SyncStatus,
    counts: SyncCounts,
    message: Option<String>,
) -> Result<SyncLog> {
    let now = Utc::now().naive_utc();
    let updated = diesel::update(
        sync_logs::table
            .filter(sync_logs::id.eq(log_id))
            .filter(sync_logs::status.eq(SyncStatus::InProgress.as_str())),
    )
    .set((
        sync_logs::status.eq(status.as_str()),
        sync_logs::completed_at.eq(Some(now)),
        sync_logs::total_records.eq(counts.total_records),
        sync_logs::processed_records.eq(counts.processed_records),
        sync_logs::failed_records.eq(counts.failed_records),
        sync_logs::error_message.eq(message.map(truncate_message)),
    ))
    .execute(conn)
    .map_err(StorageError::from)?;

    let row = sync_logs::table
        .find(log_id)
        .select(SyncLogDB::as_select())
        .first::<SyncLogDB>(conn)
        .optional()
        .map_err(StorageError::from)?
        .ok_or_else(|| Error::not_found("Sync log", log_id))?;

    if updated == 0 {
        warn!(
            "[SyncLog] Refusing to move log {} to {}: already {}",
            log_id, status, row.status
        );
        return Err(Error::validation(format!(
            "Sync log {} is already {}",
            log_id, row.status
        )));
    }

    SyncLog::try_from(row)
}

pub struct SyncLogRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl SyncLogRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl SyncLogRepositoryTrait for SyncLogRepository {
    async fn create_sync_log(&self, new_log: NewSyncLog) -> Result<SyncLog> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<SyncLog> {
                let row = SyncLogDB {
                    id: Uuid::now_v7().to_string(),
                    store_id: new_log.store_id,
                    entity_type: new_log.entity_type.as_str().to_string(),
                    status: SyncStatus::InProgress.as_str().to_string(),
                    started_at: Utc::now().naive_utc(),
                    completed_at: None,
                    total_records: 0,
                    processed_records: 0,
                    failed_records: 0,
                    error_message: None,
                };

                diesel::insert_into(sync_logs::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;

                SyncLog::try_from(row)
            })
            .await
    }

    async fn complete_sync_log(
        &self,
        log_id: &str,
        counts: SyncCounts,
        summary: Option<String>,
    ) -> Result<SyncLog> {
        let log_id = log_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| {
                finalize_tx(conn, &log_id, SyncStatus::Completed, counts, summary)
            })
            .await
    }

    async fn fail_sync_log(
        &self,
        log_id: &str,
        counts: SyncCounts,
        error_message: String,
    ) -> Result<SyncLog> {
        let log_id = log_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| {
                finalize_tx(
                    conn,
                    &log_id,
                    SyncStatus::Failed,
                    counts,
                    Some(error_message),
                )
            })
            .await
    }

    fn get_sync_log(&self, log_id: &str) -> Result<Option<SyncLog>> {
        let mut conn = get_connection(&self.pool)?;
        sync_logs::table
            .find(log_id)
            .select(SyncLogDB::as_select())
            .first::<SyncLogDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?
            .map(SyncLog::try_from)
            .transpose()
    }

    fn list_sync_logs(&self, store_id: Option<&str>, limit: i64) -> Result<Vec<SyncLog>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = sync_logs::table
            .select(SyncLogDB::as_select())
            .into_boxed();
        if let Some(store_id) = store_id {
            query = query.filter(sync_logs::store_id.eq(store_id.to_string()));
        }

        query
            .order((sync_logs::started_at.desc(), sync_logs::id.desc()))
            .limit(limit.max(1))
            .load::<SyncLogDB>(&mut conn)
            .map_err(StorageError::from)?
            .into_iter()
            .map(SyncLog::try_from)
            .collect()
    }
}
