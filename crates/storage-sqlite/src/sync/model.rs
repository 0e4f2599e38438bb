//! Database model for sync run logs.

use chrono::{NaiveDateTime, TimeZone, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use faire_sync_core::sync::SyncLog;
use faire_sync_core::Result;

#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    Debug,
    Clone,
    Serialize,
    Deserialize,
)]
#[diesel(table_name = crate::schema::sync_logs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SyncLogDB {
    pub id: String,
    pub store_id: String,
    pub entity_type: String,
    pub status: String,
    pub started_at: NaiveDateTime,
    pub completed_at: Option<NaiveDateTime>,
    pub total_records: i64,
    pub processed_records: i64,
    pub failed_records: i64,
    pub error_message: Option<String>,
}

impl TryFrom<SyncLogDB> for SyncLog {
    type Error = faire_sync_core::Error;

    fn try_from(db: SyncLogDB) -> Result<Self> {
        Ok(Self {
            id: db.id,
            store_id: db.store_id,
            entity_type: db.entity_type.parse()?,
            status: db.status.parse()?,
            started_at: Utc.from_utc_datetime(&db.started_at),
            completed_at: db.completed_at.map(|dt| Utc.from_utc_datetime(&dt)),
            total_records: db.total_records,
            processed_records: db.processed_records,
            failed_records: db.failed_records,
            error_message: db.error_message,
        })
    }
}
