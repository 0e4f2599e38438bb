use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use uuid::Uuid;

use faire_sync_core::stores::{NewStore, Store, StoreRepositoryTrait};
use faire_sync_core::Result;

use super::model::StoreDB;
use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::schema::stores;

pub struct StoreRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl StoreRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl StoreRepositoryTrait for StoreRepository {
    fn get_store_by_code(&self, code: &str) -> Result<Option<Store>> {
        let mut conn = get_connection(&self.pool)?;
        let row = stores::table
            .filter(stores::code.eq(code.trim()))
            .select(StoreDB::as_select())
            .first::<StoreDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(Store::from))
    }

    fn list_stores(&self) -> Result<Vec<Store>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = stores::table
            .order(stores::code.asc())
            .select(StoreDB::as_select())
            .load::<StoreDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Store::from).collect())
    }

    async fn upsert_store(&self, new_store: NewStore) -> Result<Store> {
        new_store.validate()?;

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Store> {
                let now = Utc::now().naive_utc();
                let code = new_store.code.trim().to_string();

                let existing = stores::table
                    .filter(stores::code.eq(&code))
                    .select(StoreDB::as_select())
                    .first::<StoreDB>(conn)
                    .optional()
                    .map_err(StorageError::from)?;

                let row = match existing {
                    Some(mut row) => {
                        row.name = new_store.name.trim().to_string();
                        if new_store.faire_app_credentials.is_some() {
                            row.faire_app_credentials = new_store.faire_app_credentials;
                        }
                        if new_store.faire_oauth_access_token.is_some() {
                            row.faire_oauth_access_token = new_store.faire_oauth_access_token;
                        }
                        row.updated_at = now;

                        diesel::update(stores::table.find(&row.id))
                            .set(&row)
                            .execute(conn)
                            .map_err(StorageError::from)?;
                        row
                    }
                    None => {
                        let row = StoreDB {
                            id: Uuid::new_v4().to_string(),
                            code,
                            name: new_store.name.trim().to_string(),
                            faire_app_credentials: new_store.faire_app_credentials,
                            faire_oauth_access_token: new_store.faire_oauth_access_token,
                            created_at: now,
                            updated_at: now,
                        };
                        diesel::insert_into(stores::table)
                            .values(&row)
                            .execute(conn)
                            .map_err(StorageError::from)?;
                        row
                    }
                };

                Ok(Store::from(row))
            })
            .await
    }
}
