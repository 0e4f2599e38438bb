//! Database model for stores.

use chrono::{NaiveDateTime, TimeZone, Utc};
use diesel::prelude::*;

use faire_sync_core::stores::Store;

#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, Clone)]
#[diesel(table_name = crate::schema::stores)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct StoreDB {
    pub id: String,
    pub code: String,
    pub name: String,
    pub faire_app_credentials: Option<String>,
    pub faire_oauth_access_token: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<StoreDB> for Store {
    fn from(db: StoreDB) -> Self {
        Self {
            id: db.id,
            code: db.code,
            name: db.name,
            faire_app_credentials: db.faire_app_credentials,
            faire_oauth_access_token: db.faire_oauth_access_token,
            created_at: Utc.from_utc_datetime(&db.created_at),
            updated_at: Utc.from_utc_datetime(&db.updated_at),
        }
    }
}
