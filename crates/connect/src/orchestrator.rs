//! Product catalog synchronization.
//!
//! A run pages through the store's Faire catalog and upserts every record into
//! the local mirror, bracketing the work with a sync log row that ends in
//! exactly one terminal status.

use std::sync::Arc;
use std::time::{Duration, Instant};

use faire_sync_core::products::{ProductRepositoryTrait, UpsertAction};
use faire_sync_core::stores::{Store, StoreRepositoryTrait};
use faire_sync_core::sync::{
    NewSyncLog, SyncCounts, SyncEntityType, SyncLogRepositoryTrait, SyncStatus,
};
use log::{debug, error, info, warn};
use serde::Serialize;
use tokio::time::sleep;

use crate::client::FaireCatalogApi;
use crate::error::Result;
use crate::mapping::map_product;
use crate::progress::{SyncProgressPayload, SyncProgressReporter};
use crate::types::{ProductRecord, ProductsPage};

pub const DEFAULT_PAGE_LIMIT: u32 = 50;
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_millis(500);
pub const DEFAULT_MAX_PAGES: usize = 10_000;

/// Per-record failures logged individually at the end of a run.
const MAX_LOGGED_FAILURES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    /// Records requested per page.
    pub page_limit: u32,
    /// Pause between consecutive page requests.
    pub page_delay: Duration,
    /// Hard stop for catalogs whose cursor never terminates.
    pub max_pages: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            page_limit: DEFAULT_PAGE_LIMIT,
            page_delay: DEFAULT_PAGE_DELAY,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordFailure {
    pub faire_product_id: Option<String>,
    pub error: String,
}

/// What happened to a single API record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RecordOutcome {
    Upserted {
        faire_product_id: String,
        action: UpsertAction,
        variants: usize,
    },
    Failed(RecordFailure),
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    pub success: bool,
    pub message: String,
    pub log_id: String,
    pub store_code: String,
    pub status: SyncStatus,
    pub pages_fetched: usize,
    pub counts: SyncCounts,
    pub products_inserted: usize,
    pub products_updated: usize,
    pub variants_upserted: usize,
    pub failures: Vec<RecordFailure>,
    pub duration_ms: u64,
}

#[derive(Debug, Default)]
struct RunProgress {
    pages_fetched: usize,
    products_inserted: usize,
    products_updated: usize,
    variants_upserted: usize,
    failures: Vec<RecordFailure>,
}

impl RunProgress {
    fn record(&mut self, outcome: RecordOutcome) {
        match outcome {
            RecordOutcome::Upserted {
                action, variants, ..
            } => {
                match action {
                    UpsertAction::Inserted => self.products_inserted += 1,
                    UpsertAction::Updated => self.products_updated += 1,
                }
                self.variants_upserted += variants;
            }
            RecordOutcome::Failed(failure) => self.failures.push(failure),
        }
    }

    fn counts(&self) -> SyncCounts {
        let processed = (self.products_inserted + self.products_updated) as i64;
        let failed = self.failures.len() as i64;
        SyncCounts {
            total_records: processed + failed,
            processed_records: processed,
            failed_records: failed,
        }
    }

    /// Short note stored on a completed log that had record failures.
    fn failure_summary(&self) -> Option<String> {
        let first = self.failures.first()?;
        let counts = self.counts();
        Some(format!(
            "{} of {} records failed; first: {}",
            counts.failed_records, counts.total_records, first.error
        ))
    }
}

/// Environment lookup used for credential fallbacks.
pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Mirrors a store's Faire products into local storage.
pub struct ProductSyncOrchestrator {
    store_repository: Arc<dyn StoreRepositoryTrait>,
    product_repository: Arc<dyn ProductRepositoryTrait>,
    sync_log_repository: Arc<dyn SyncLogRepositoryTrait>,
    catalog: Arc<dyn FaireCatalogApi>,
    reporter: Arc<dyn SyncProgressReporter>,
    config: SyncConfig,
    env: EnvLookup,
}

impl ProductSyncOrchestrator {
    pub fn new(
        store_repository: Arc<dyn StoreRepositoryTrait>,
        product_repository: Arc<dyn ProductRepositoryTrait>,
        sync_log_repository: Arc<dyn SyncLogRepositoryTrait>,
        catalog: Arc<dyn FaireCatalogApi>,
        reporter: Arc<dyn SyncProgressReporter>,
    ) -> Self {
        Self {
            store_repository,
            product_repository,
            sync_log_repository,
            catalog,
            reporter,
            config: SyncConfig::default(),
            env: Arc::new(|key| std::env::var(key).ok()),
        }
    }

    pub fn with_config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the process environment as the credentials fallback.
    pub fn with_env_lookup(mut self, env: EnvLookup) -> Self {
        self.env = env;
        self
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Runs a full product sync for the store identified by `store_code`.
    ///
    /// Returns `Err` only when no sync log could be opened (unknown store or
    /// storage failure). Once a log exists, fatal errors are reported through
    /// a `SyncResult` with `success == false` and the log marked `failed`.
    pub async fn run_sync(&self, store_code: &str) -> Result<SyncResult> {
        let store_code = store_code.trim();
        let store = self
            .store_repository
            .get_store_by_code(store_code)?
            .ok_or_else(|| faire_sync_core::Error::not_found("Store", store_code))?;

        let log = self
            .sync_log_repository
            .create_sync_log(NewSyncLog {
                store_id: store.id.clone(),
                entity_type: SyncEntityType::Products,
            })
            .await?;

        info!(
            "[FaireSync] Starting product sync for store '{}' (log {})",
            store.code, log.id
        );
        self.reporter.report_sync_start(&store.code, &log.id);

        let started = Instant::now();
        let mut progress = RunProgress::default();
        let outcome = self.sync_pages(&store, &log.id, &mut progress).await;
        log_record_failures(&store.code, &progress.failures);
        let counts = progress.counts();

        let (status, message) = match outcome {
            Ok(()) => {
                match self
                    .sync_log_repository
                    .complete_sync_log(&log.id, counts, progress.failure_summary())
                    .await
                {
                    Ok(_) => (
                        SyncStatus::Completed,
                        format!(
                            "Synced {} products ({} inserted, {} updated), {} failed",
                            counts.processed_records,
                            progress.products_inserted,
                            progress.products_updated,
                            counts.failed_records
                        ),
                    ),
                    Err(e) => {
                        let message = format!("Failed to record sync completion: {}", e);
                        error!("[FaireSync] {}", message);
                        self.mark_failed(&log.id, counts, message.clone()).await;
                        (SyncStatus::Failed, message)
                    }
                }
            }
            Err(err) => {
                let message = err.to_string();
                error!(
                    "[FaireSync] Product sync for store '{}' failed after {} page(s): {}",
                    store.code, progress.pages_fetched, message
                );
                self.mark_failed(&log.id, counts, message.clone()).await;
                (SyncStatus::Failed, message)
            }
        };

        let result = SyncResult {
            success: status == SyncStatus::Completed,
            message,
            log_id: log.id,
            store_code: store.code,
            status,
            pages_fetched: progress.pages_fetched,
            counts,
            products_inserted: progress.products_inserted,
            products_updated: progress.products_updated,
            variants_upserted: progress.variants_upserted,
            failures: progress.failures,
            duration_ms: started.elapsed().as_millis() as u64,
        };

        if result.success {
            info!("[FaireSync] {} in {} ms", result.message, result.duration_ms);
        }
        self.reporter.report_sync_complete(&result);
        Ok(result)
    }

    async fn mark_failed(&self, log_id: &str, counts: SyncCounts, message: String) {
        if let Err(e) = self
            .sync_log_repository
            .fail_sync_log(log_id, counts, message)
            .await
        {
            error!("[FaireSync] Failed to mark sync log {} as failed: {}", log_id, e);
        }
    }

    /// Fetches and processes pages until the catalog is exhausted.
    ///
    /// Any error returned here is fatal for the run.
    async fn sync_pages(
        &self,
        store: &Store,
        log_id: &str,
        progress: &mut RunProgress,
    ) -> Result<()> {
        let credentials = store.resolve_credentials_with(|key| (self.env)(key))?;
        let mut cursor: Option<String> = None;

        loop {
            if progress.pages_fetched >= self.config.max_pages {
                warn!(
                    "[FaireSync] Stopping after {} pages for store '{}'",
                    self.config.max_pages, store.code
                );
                break;
            }

            let ProductsPage {
                products,
                cursor: next_cursor,
            } = self
                .catalog
                .fetch_products_page(&credentials, cursor.as_deref(), self.config.page_limit)
                .await?;
            progress.pages_fetched += 1;

            if products.is_empty() {
                debug!(
                    "[FaireSync] Page {} is empty, catalog exhausted",
                    progress.pages_fetched
                );
                break;
            }

            debug!(
                "[FaireSync] Page {}: {} products",
                progress.pages_fetched,
                products.len()
            );
            for record in products {
                let outcome = self.sync_record(&store.id, record).await;
                progress.record(outcome);
            }

            let counts = progress.counts();
            self.reporter.report_progress(SyncProgressPayload {
                store_code: store.code.clone(),
                log_id: log_id.to_string(),
                page: progress.pages_fetched,
                total_records: counts.total_records,
                processed_records: counts.processed_records,
                failed_records: counts.failed_records,
            });

            let next_cursor = next_cursor
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty());
            match next_cursor {
                None => break,
                Some(next) if cursor.as_deref() == Some(next.as_str()) => {
                    warn!(
                        "[FaireSync] Cursor did not advance after page {}, stopping",
                        progress.pages_fetched
                    );
                    break;
                }
                Some(next) => cursor = Some(next),
            }

            if !self.config.page_delay.is_zero() {
                sleep(self.config.page_delay).await;
            }
        }

        Ok(())
    }

    async fn sync_record(&self, store_id: &str, record: ProductRecord) -> RecordOutcome {
        let product = match record {
            ProductRecord::Product(product) => product,
            ProductRecord::Malformed { id, error } => {
                return RecordOutcome::Failed(RecordFailure {
                    faire_product_id: id,
                    error,
                })
            }
        };
        let (new_product, variants) = match map_product(store_id, &product) {
            Ok(mapped) => mapped,
            Err(e) => {
                return RecordOutcome::Failed(RecordFailure {
                    faire_product_id: product.id,
                    error: e.to_string(),
                })
            }
        };

        let faire_product_id = new_product.faire_product_id.clone();
        let variant_count = variants.len();
        match self
            .product_repository
            .upsert_product(new_product, variants)
            .await
        {
            Ok(result) => RecordOutcome::Upserted {
                faire_product_id,
                action: result.action,
                variants: variant_count,
            },
            Err(e) => RecordOutcome::Failed(RecordFailure {
                faire_product_id: Some(faire_product_id),
                error: e.to_string(),
            }),
        }
    }
}

fn log_record_failures(store_code: &str, failures: &[RecordFailure]) {
    if failures.is_empty() {
        return;
    }
    warn!(
        "[FaireSync] {} record(s) failed for store '{}'",
        failures.len(),
        store_code
    );
    for failure in failures.iter().take(MAX_LOGGED_FAILURES) {
        warn!(
            "[FaireSync]   {}: {}",
            failure.faire_product_id.as_deref().unwrap_or("<no id>"),
            failure.error
        );
    }
    if failures.len() > MAX_LOGGED_FAILURES {
        warn!(
            "[FaireSync]   ... and {} more",
            failures.len() - MAX_LOGGED_FAILURES
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConnectError;
    use crate::progress::NoOpProgressReporter;
    use crate::types::{FaireProduct, FaireVariant};
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use faire_sync_core::errors::{DatabaseError, Error};
    use faire_sync_core::products::{
        NewProduct, NewProductVariant, Product, ProductUpsertResult, ProductVariant,
    };
    use faire_sync_core::stores::{FaireCredentials, NewStore, FAIRE_APP_CREDENTIALS_ENV};
    use faire_sync_core::sync::SyncLog;
    use std::collections::{HashMap, HashSet, VecDeque};
    use std::sync::Mutex;

    // ── fakes ───────────────────────────────────────────────────────────────

    struct FakeStores {
        stores: Vec<Store>,
    }

    #[async_trait]
    impl StoreRepositoryTrait for FakeStores {
        fn get_store_by_code(&self, code: &str) -> faire_sync_core::Result<Option<Store>> {
            Ok(self.stores.iter().find(|s| s.code == code).cloned())
        }

        fn list_stores(&self) -> faire_sync_core::Result<Vec<Store>> {
            Ok(self.stores.clone())
        }

        async fn upsert_store(&self, _new_store: NewStore) -> faire_sync_core::Result<Store> {
            Err(Error::Internal("read-only fake".to_string()))
        }
    }

    #[derive(Default)]
    struct FakeProducts {
        products: Mutex<HashMap<(String, String), (String, NewProduct)>>,
        variants: Mutex<HashMap<(String, String), NewProductVariant>>,
        failing_ids: HashSet<String>,
    }

    impl FakeProducts {
        fn failing(ids: &[&str]) -> Self {
            Self {
                failing_ids: ids.iter().map(|id| id.to_string()).collect(),
                ..Default::default()
            }
        }

        fn variant_count(&self) -> usize {
            self.variants.lock().unwrap().len()
        }
    }

    fn to_product(id: &str, new: &NewProduct, now: DateTime<Utc>) -> Product {
        Product {
            id: id.to_string(),
            store_id: new.store_id.clone(),
            faire_product_id: new.faire_product_id.clone(),
            faire_brand_id: new.faire_brand_id.clone(),
            name: new.name.clone(),
            short_description: new.short_description.clone(),
            description: new.description.clone(),
            lifecycle_state: new.lifecycle_state.clone(),
            sale_state: new.sale_state.clone(),
            unit_multiplier: new.unit_multiplier,
            minimum_order_quantity: new.minimum_order_quantity,
            taxonomy_type: new.taxonomy_type.clone(),
            image_urls: new.image_urls.clone(),
            faire_created_at: new.faire_created_at,
            faire_updated_at: new.faire_updated_at,
            last_synced_at: now,
            created_at: now,
            updated_at: now,
        }
    }

    #[async_trait]
    impl ProductRepositoryTrait for FakeProducts {
        async fn upsert_product(
            &self,
            product: NewProduct,
            variants: Vec<NewProductVariant>,
        ) -> faire_sync_core::Result<ProductUpsertResult> {
            if self.failing_ids.contains(&product.faire_product_id) {
                return Err(Error::Database(DatabaseError::QueryFailed(
                    "disk I/O error".to_string(),
                )));
            }

            let key = (product.faire_product_id.clone(), product.store_id.clone());
            let mut products = self.products.lock().unwrap();
            let (product_id, action) = match products.get(&key) {
                Some((id, _)) => (id.clone(), UpsertAction::Updated),
                None => (format!("row-{}", products.len() + 1), UpsertAction::Inserted),
            };

            let mut stored_variants = self.variants.lock().unwrap();
            let mut result = ProductUpsertResult {
                product_id: product_id.clone(),
                action,
                variants_inserted: 0,
                variants_updated: 0,
            };
            for variant in variants {
                let variant_key = (variant.faire_variant_id.clone(), product.store_id.clone());
                if stored_variants.insert(variant_key, variant).is_some() {
                    result.variants_updated += 1;
                } else {
                    result.variants_inserted += 1;
                }
            }

            products.insert(key, (product_id, product));
            Ok(result)
        }

        fn list_products(&self, store_id: &str) -> faire_sync_core::Result<Vec<Product>> {
            let now = Utc::now();
            Ok(self
                .products
                .lock()
                .unwrap()
                .values()
                .filter(|(_, p)| p.store_id == store_id)
                .map(|(id, p)| to_product(id, p, now))
                .collect())
        }

        fn list_variants(&self, _product_id: &str) -> faire_sync_core::Result<Vec<ProductVariant>> {
            Ok(Vec::new())
        }

        fn count_products(&self, store_id: &str) -> faire_sync_core::Result<i64> {
            Ok(self.list_products(store_id)?.len() as i64)
        }

        fn list_stale_products(
            &self,
            _store_id: &str,
            _synced_before: DateTime<Utc>,
        ) -> faire_sync_core::Result<Vec<Product>> {
            Ok(Vec::new())
        }
    }

    #[derive(Default)]
    struct FakeSyncLogs {
        logs: Mutex<HashMap<String, SyncLog>>,
        transitions: Mutex<Vec<(String, SyncStatus)>>,
        reject_completion: bool,
    }

    impl FakeSyncLogs {
        fn only_log(&self) -> SyncLog {
            let logs = self.logs.lock().unwrap();
            assert_eq!(logs.len(), 1, "expected exactly one sync log");
            logs.values().next().cloned().unwrap()
        }

        fn transitions(&self) -> Vec<(String, SyncStatus)> {
            self.transitions.lock().unwrap().clone()
        }

        fn finalize(
            &self,
            log_id: &str,
            status: SyncStatus,
            counts: SyncCounts,
            message: Option<String>,
        ) -> faire_sync_core::Result<SyncLog> {
            let mut logs = self.logs.lock().unwrap();
            let log = logs
                .get_mut(log_id)
                .ok_or_else(|| Error::not_found("Sync log", log_id))?;
            if log.status.is_terminal() {
                return Err(Error::validation(format!(
                    "Sync log {} is already {}",
                    log_id, log.status
                )));
            }
            log.status = status;
            log.completed_at = Some(Utc::now());
            log.total_records = counts.total_records;
            log.processed_records = counts.processed_records;
            log.failed_records = counts.failed_records;
            log.error_message = message;
            self.transitions
                .lock()
                .unwrap()
                .push((log_id.to_string(), status));
            Ok(log.clone())
        }
    }

    #[async_trait]
    impl SyncLogRepositoryTrait for FakeSyncLogs {
        async fn create_sync_log(&self, new_log: NewSyncLog) -> faire_sync_core::Result<SyncLog> {
            let mut logs = self.logs.lock().unwrap();
            let log = SyncLog {
                id: format!("log-{}", logs.len() + 1),
                store_id: new_log.store_id,
                entity_type: new_log.entity_type,
                status: SyncStatus::InProgress,
                started_at: Utc::now(),
                completed_at: None,
                total_records: 0,
                processed_records: 0,
                failed_records: 0,
                error_message: None,
            };
            logs.insert(log.id.clone(), log.clone());
            Ok(log)
        }

        async fn complete_sync_log(
            &self,
            log_id: &str,
            counts: SyncCounts,
            summary: Option<String>,
        ) -> faire_sync_core::Result<SyncLog> {
            if self.reject_completion {
                return Err(Error::Database(DatabaseError::QueryFailed(
                    "database is locked".to_string(),
                )));
            }
            self.finalize(log_id, SyncStatus::Completed, counts, summary)
        }

        async fn fail_sync_log(
            &self,
            log_id: &str,
            counts: SyncCounts,
            error_message: String,
        ) -> faire_sync_core::Result<SyncLog> {
            self.finalize(log_id, SyncStatus::Failed, counts, Some(error_message))
        }

        fn get_sync_log(&self, log_id: &str) -> faire_sync_core::Result<Option<SyncLog>> {
            Ok(self.logs.lock().unwrap().get(log_id).cloned())
        }

        fn list_sync_logs(
            &self,
            _store_id: Option<&str>,
            _limit: i64,
        ) -> faire_sync_core::Result<Vec<SyncLog>> {
            Ok(self.logs.lock().unwrap().values().cloned().collect())
        }
    }

    enum Step {
        Page(ProductsPage),
        Fail(u16),
    }

    struct ScriptedCatalog {
        steps: Mutex<VecDeque<Step>>,
        requested_cursors: Mutex<Vec<Option<String>>>,
    }

    impl ScriptedCatalog {
        fn new(steps: Vec<Step>) -> Arc<Self> {
            Arc::new(Self {
                steps: Mutex::new(VecDeque::from(steps)),
                requested_cursors: Mutex::new(Vec::new()),
            })
        }

        fn requested_cursors(&self) -> Vec<Option<String>> {
            self.requested_cursors.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl FaireCatalogApi for ScriptedCatalog {
        async fn fetch_products_page(
            &self,
            credentials: &FaireCredentials,
            cursor: Option<&str>,
            _limit: u32,
        ) -> Result<ProductsPage> {
            assert_eq!(credentials.access_token, "token");
            self.requested_cursors
                .lock()
                .unwrap()
                .push(cursor.map(str::to_string));
            match self.steps.lock().unwrap().pop_front() {
                Some(Step::Page(page)) => Ok(page),
                Some(Step::Fail(status)) => Err(ConnectError::api(status, "upstream exploded")),
                None => Ok(ProductsPage::default()),
            }
        }
    }

    // ── helpers ─────────────────────────────────────────────────────────────

    fn store() -> Store {
        Store {
            id: "store-1".to_string(),
            code: "toyarina".to_string(),
            name: "Toyarina".to_string(),
            faire_app_credentials: Some("app".to_string()),
            faire_oauth_access_token: Some("token".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn product(id: &str) -> FaireProduct {
        FaireProduct {
            id: Some(id.to_string()),
            name: Some(format!("Product {}", id)),
            variants: vec![FaireVariant {
                id: Some(format!("{}-v1", id)),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn page(ids: &[&str], cursor: Option<&str>) -> Step {
        Step::Page(ProductsPage {
            products: ids.iter().map(|id| product(id).into()).collect(),
            cursor: cursor.map(str::to_string),
        })
    }

    struct Harness {
        store: Store,
        products: Arc<FakeProducts>,
        logs: Arc<FakeSyncLogs>,
    }

    impl Harness {
        fn new(products: FakeProducts, logs: FakeSyncLogs) -> Self {
            Self {
                store: store(),
                products: Arc::new(products),
                logs: Arc::new(logs),
            }
        }

        fn orchestrator(&self, catalog: Arc<ScriptedCatalog>) -> ProductSyncOrchestrator {
            ProductSyncOrchestrator::new(
                Arc::new(FakeStores {
                    stores: vec![self.store.clone()],
                }),
                self.products.clone(),
                self.logs.clone(),
                catalog,
                Arc::new(NoOpProgressReporter),
            )
            .with_config(SyncConfig {
                page_limit: 2,
                page_delay: Duration::ZERO,
                max_pages: 100,
            })
            .with_env_lookup(Arc::new(|_| None))
        }
    }

    // ── tests ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn empty_page_stops_pagination() {
        let harness = Harness::new(FakeProducts::default(), FakeSyncLogs::default());
        let catalog = ScriptedCatalog::new(vec![
            page(&["p1", "p2"], Some("c1")),
            page(&[], Some("c2")),
            page(&["p3"], None),
        ]);

        let result = harness
            .orchestrator(catalog.clone())
            .run_sync("toyarina")
            .await
            .expect("run");

        assert!(result.success);
        assert_eq!(result.pages_fetched, 2);
        assert_eq!(
            catalog.requested_cursors(),
            vec![None, Some("c1".to_string())]
        );
        assert_eq!(
            result.counts,
            SyncCounts {
                total_records: 2,
                processed_records: 2,
                failed_records: 0,
            }
        );

        let log = harness.logs.only_log();
        assert_eq!(log.status, SyncStatus::Completed);
        assert_eq!(log.processed_records, 2);
        assert_eq!(log.error_message, None);
        assert_eq!(
            harness.logs.transitions(),
            vec![(log.id.clone(), SyncStatus::Completed)]
        );
    }

    #[tokio::test]
    async fn fetch_error_fails_log_and_stops_fetching() {
        let harness = Harness::new(FakeProducts::default(), FakeSyncLogs::default());
        let catalog = ScriptedCatalog::new(vec![
            page(&["p1"], Some("c1")),
            Step::Fail(500),
            page(&["p2"], None),
        ]);

        let result = harness
            .orchestrator(catalog.clone())
            .run_sync("toyarina")
            .await
            .expect("run");

        assert!(!result.success);
        assert_eq!(result.status, SyncStatus::Failed);
        assert_eq!(catalog.requested_cursors().len(), 2);

        let log = harness.logs.only_log();
        assert_eq!(log.status, SyncStatus::Failed);
        let message = log.error_message.expect("error message");
        assert!(!message.is_empty());
        assert!(message.contains("500"));
        assert_eq!(log.processed_records, 1);
        assert_eq!(harness.logs.transitions().len(), 1);
    }

    #[tokio::test]
    async fn record_failures_are_counted_and_run_continues() {
        let harness = Harness::new(FakeProducts::failing(&["p_bad"]), FakeSyncLogs::default());
        let nameless = FaireProduct {
            id: None,
            name: Some("No id".to_string()),
            ..Default::default()
        };
        let catalog = ScriptedCatalog::new(vec![
            Step::Page(ProductsPage {
                products: vec![product("p1").into(), nameless.into(), product("p_bad").into()],
                cursor: Some("c1".to_string()),
            }),
            page(&["p4"], None),
        ]);

        let result = harness
            .orchestrator(catalog.clone())
            .run_sync("toyarina")
            .await
            .expect("run");

        assert!(result.success);
        assert_eq!(result.pages_fetched, 2);
        assert_eq!(
            result.counts,
            SyncCounts {
                total_records: 4,
                processed_records: 2,
                failed_records: 2,
            }
        );
        assert_eq!(result.failures.len(), 2);
        assert_eq!(result.failures[0].faire_product_id, None);
        assert_eq!(result.failures[1].faire_product_id.as_deref(), Some("p_bad"));

        let log = harness.logs.only_log();
        assert_eq!(log.status, SyncStatus::Completed);
        assert_eq!(log.failed_records, 2);
        assert!(log
            .error_message
            .as_deref()
            .is_some_and(|m| m.starts_with("2 of 4 records failed")));
    }

    #[tokio::test]
    async fn repeated_runs_update_instead_of_duplicating() {
        let harness = Harness::new(FakeProducts::default(), FakeSyncLogs::default());

        let first = harness
            .orchestrator(ScriptedCatalog::new(vec![page(&["p1", "p2"], None)]))
            .run_sync("toyarina")
            .await
            .expect("first run");
        let second = harness
            .orchestrator(ScriptedCatalog::new(vec![page(&["p1", "p2"], None)]))
            .run_sync("toyarina")
            .await
            .expect("second run");

        assert_eq!(first.products_inserted, 2);
        assert_eq!(second.products_inserted, 0);
        assert_eq!(second.products_updated, 2);
        assert_eq!(harness.products.count_products("store-1").expect("count"), 2);
        assert_eq!(harness.products.variant_count(), 2);
        assert_ne!(first.log_id, second.log_id);
    }

    #[tokio::test]
    async fn unchanged_cursor_stops_pagination() {
        let harness = Harness::new(FakeProducts::default(), FakeSyncLogs::default());
        let catalog = ScriptedCatalog::new(vec![
            page(&["p1"], Some("c1")),
            page(&["p2"], Some("c1")),
            page(&["p3"], None),
        ]);

        let result = harness
            .orchestrator(catalog.clone())
            .run_sync("toyarina")
            .await
            .expect("run");

        assert!(result.success);
        assert_eq!(catalog.requested_cursors().len(), 2);
        assert_eq!(result.counts.processed_records, 2);
    }

    #[tokio::test]
    async fn max_pages_caps_the_run() {
        let harness = Harness::new(FakeProducts::default(), FakeSyncLogs::default());
        let catalog = ScriptedCatalog::new(vec![
            page(&["p1"], Some("c1")),
            page(&["p2"], Some("c2")),
            page(&["p3"], Some("c3")),
        ]);

        let result = harness
            .orchestrator(catalog.clone())
            .with_config(SyncConfig {
                page_limit: 1,
                page_delay: Duration::ZERO,
                max_pages: 2,
            })
            .run_sync("toyarina")
            .await
            .expect("run");

        assert!(result.success);
        assert_eq!(result.pages_fetched, 2);
        assert_eq!(catalog.requested_cursors().len(), 2);
    }

    #[tokio::test]
    async fn unknown_store_errors_without_creating_a_log() {
        let harness = Harness::new(FakeProducts::default(), FakeSyncLogs::default());
        let catalog = ScriptedCatalog::new(vec![page(&["p1"], None)]);

        let err = harness
            .orchestrator(catalog.clone())
            .run_sync("missing")
            .await
            .expect_err("unknown store");

        assert!(matches!(err, ConnectError::Core(ref e) if e.is_not_found()));
        assert!(harness.logs.logs.lock().unwrap().is_empty());
        assert!(catalog.requested_cursors().is_empty());
    }

    #[tokio::test]
    async fn completion_write_failure_marks_log_failed_once() {
        let harness = Harness::new(
            FakeProducts::default(),
            FakeSyncLogs {
                reject_completion: true,
                ..Default::default()
            },
        );

        let result = harness
            .orchestrator(ScriptedCatalog::new(vec![page(&["p1"], None)]))
            .run_sync("toyarina")
            .await
            .expect("run");

        assert!(!result.success);
        assert!(result.message.contains("database is locked"));
        let log = harness.logs.only_log();
        assert_eq!(log.status, SyncStatus::Failed);
        assert_eq!(
            harness.logs.transitions(),
            vec![(log.id, SyncStatus::Failed)]
        );
    }

    #[tokio::test]
    async fn malformed_record_fails_alone() {
        let harness = Harness::new(FakeProducts::default(), FakeSyncLogs::default());
        let first: ProductsPage = serde_json::from_str(
            r#"{
                "products": [
                    { "id": "p1", "name": "Wooden Train", "variants": [{ "id": "p1-v1" }] },
                    { "id": "p2", "name": "Kite", "unit_multiplier": "2" },
                    { "id": "p3", "name": "Yo-yo", "variants": [{ "id": "p3-v1" }] }
                ],
                "cursor": "c1"
            }"#,
        )
        .expect("parse page");
        let catalog = ScriptedCatalog::new(vec![Step::Page(first), page(&["p4"], None)]);

        let result = harness
            .orchestrator(catalog.clone())
            .run_sync("toyarina")
            .await
            .expect("run");

        assert!(result.success);
        assert_eq!(result.pages_fetched, 2);
        assert_eq!(
            result.counts,
            SyncCounts {
                total_records: 4,
                processed_records: 3,
                failed_records: 1,
            }
        );
        assert_eq!(result.failures[0].faire_product_id.as_deref(), Some("p2"));
        assert!(result.failures[0].error.starts_with("Malformed product record"));

        let log = harness.logs.only_log();
        assert_eq!(log.status, SyncStatus::Completed);
        assert_eq!(log.failed_records, 1);
    }

    #[tokio::test]
    async fn missing_credentials_fail_the_log_without_fetching() {
        let mut harness = Harness::new(FakeProducts::default(), FakeSyncLogs::default());
        harness.store.faire_app_credentials = None;
        harness.store.faire_oauth_access_token = None;
        let catalog = ScriptedCatalog::new(vec![page(&["p1"], None)]);

        let result = harness
            .orchestrator(catalog.clone())
            .run_sync("toyarina")
            .await
            .expect("run");

        assert!(!result.success);
        assert_eq!(result.status, SyncStatus::Failed);
        assert_eq!(result.pages_fetched, 0);
        assert!(catalog.requested_cursors().is_empty());

        let log = harness.logs.only_log();
        assert_eq!(log.status, SyncStatus::Failed);
        assert!(log
            .error_message
            .as_deref()
            .is_some_and(|m| m.contains(FAIRE_APP_CREDENTIALS_ENV)));
        assert_eq!(
            harness.logs.transitions(),
            vec![(log.id, SyncStatus::Failed)]
        );
    }
}
