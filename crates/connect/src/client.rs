//! Faire external API client.
//!
//! Authenticates every request with the app credentials and OAuth access
//! token headers, and retries rate-limited or transient failures with
//! exponential backoff.

use std::time::Duration;

use async_trait::async_trait;
use faire_sync_core::stores::FaireCredentials;
use faire_sync_core::sync::{RetryPolicy, SyncRetryClass};
use log::{debug, warn};
use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, RETRY_AFTER};
use tokio::time::sleep;

use crate::error::{ConnectError, Result};
use crate::types::{ApiErrorResponse, ProductsPage};

/// Production endpoint of the Faire external API.
pub const DEFAULT_FAIRE_API_URL: &str = "https://www.faire.com/external-api/v2";

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_LOG_BODY_CHARS: usize = 512;

const APP_CREDENTIALS_HEADER: &str = "x-faire-app-credentials";
const ACCESS_TOKEN_HEADER: &str = "x-faire-oauth-access-token";

/// Parses a `Retry-After` header given in whole seconds.
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let value = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();
    match value.parse::<u64>() {
        Ok(secs) => Some(Duration::from_secs(secs)),
        Err(_) => {
            debug!("[Faire] Ignoring non-numeric Retry-After: {}", value);
            None
        }
    }
}

fn backoff_with_jitter(
    policy: &RetryPolicy,
    attempt: usize,
    retry_after: Option<Duration>,
) -> Duration {
    let delay = policy.delay_for(attempt, retry_after);
    if retry_after.is_some() {
        return delay;
    }
    let delay_ms = delay.as_millis() as u64;
    let jitter = rand::thread_rng().gen_range(0..=(delay_ms / 5).max(1));
    Duration::from_millis(delay_ms.saturating_add(jitter))
}

/// Read access to a Faire catalog.
///
/// The sync orchestrator depends on this rather than on the HTTP client so
/// it can run against scripted catalogs.
#[async_trait]
pub trait FaireCatalogApi: Send + Sync {
    async fn fetch_products_page(
        &self,
        credentials: &FaireCredentials,
        cursor: Option<&str>,
        limit: u32,
    ) -> Result<ProductsPage>;
}

/// Client for the Faire external API.
#[derive(Debug, Clone)]
pub struct FaireApiClient {
    client: reqwest::Client,
    base_url: String,
    retry_policy: RetryPolicy,
}

impl FaireApiClient {
    fn log_response(status: reqwest::StatusCode, body: &str) {
        if status.is_success() {
            debug!("[Faire] API response status: {}", status);
            return;
        }

        let mut preview = body.chars().take(MAX_LOG_BODY_CHARS).collect::<String>();
        if body.chars().count() > MAX_LOG_BODY_CHARS {
            preview.push_str("...");
        }
        debug!("[Faire] API response error ({}): {}", status, preview);
    }

    /// Create a new Faire API client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The API root (e.g., "https://www.faire.com/external-api/v2")
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            retry_policy: RetryPolicy::default(),
        })
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create headers for an API request.
    fn headers(&self, credentials: &FaireCredentials) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let app_value = HeaderValue::from_str(credentials.app_credentials.trim())
            .map_err(|_| ConnectError::auth("Invalid app credentials format"))?;
        headers.insert(APP_CREDENTIALS_HEADER, app_value);

        let token_value = HeaderValue::from_str(credentials.access_token.trim())
            .map_err(|_| ConnectError::auth("Invalid access token format"))?;
        headers.insert(ACCESS_TOKEN_HEADER, token_value);

        Ok(headers)
    }

    /// Turn a non-success response into an API error.
    async fn error_from_response(response: reqwest::Response) -> Result<ConnectError> {
        let status = response.status();
        let retry_after = parse_retry_after(response.headers());
        let body = response.text().await?;
        Self::log_response(status, &body);

        let message = serde_json::from_str::<ApiErrorResponse>(&body)
            .ok()
            .and_then(|error| error.describe())
            .unwrap_or_else(|| format!("Request failed: {}", body));

        Ok(ConnectError::Api {
            status: status.as_u16(),
            message,
            retry_after,
        })
    }

    /// Parse a JSON response body.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            return Err(Self::error_from_response(response).await?);
        }

        let body = response.text().await?;
        Self::log_response(status, &body);

        serde_json::from_str(&body).map_err(|e| {
            log::error!(
                "[Faire] Failed to deserialize response. Body: {}, Error: {}",
                body.chars().take(MAX_LOG_BODY_CHARS).collect::<String>(),
                e
            );
            ConnectError::Json(e)
        })
    }

    /// Sends a GET request, retrying rate limits and transient failures.
    async fn get_with_retry<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        credentials: &FaireCredentials,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let headers = self.headers(credentials)?;
        let mut attempt = 0usize;

        loop {
            attempt = attempt.saturating_add(1);

            let send_result = self
                .client
                .get(&url)
                .headers(headers.clone())
                .query(query)
                .send()
                .await;

            let error = match send_result {
                Ok(response) => match Self::parse_response::<T>(response).await {
                    Ok(value) => return Ok(value),
                    Err(err) => err,
                },
                Err(err) => ConnectError::Http(err),
            };

            let retryable = error.retry_class() == SyncRetryClass::Retryable;
            if !retryable || !self.retry_policy.should_retry(attempt) {
                return Err(error);
            }

            let backoff = backoff_with_jitter(&self.retry_policy, attempt, error.retry_after());
            warn!(
                "[Faire] GET {} failed ({}); retry attempt {}/{} in {:?}",
                path,
                error,
                attempt + 1,
                self.retry_policy.max_attempts,
                backoff
            );
            sleep(backoff).await;
        }
    }

    /// Fetch one page of the brand's products.
    ///
    /// GET /products?limit={limit}[&cursor={cursor}]
    pub async fn get_products_page(
        &self,
        credentials: &FaireCredentials,
        cursor: Option<&str>,
        limit: u32,
    ) -> Result<ProductsPage> {
        if limit == 0 {
            return Err(ConnectError::invalid_request("Page limit must be positive"));
        }

        let mut query = vec![("limit", limit.to_string())];
        if let Some(cursor) = cursor.map(str::trim).filter(|c| !c.is_empty()) {
            query.push(("cursor", cursor.to_string()));
        }

        debug!(
            "[Faire] Fetching products page (limit={}, cursor={})",
            limit,
            cursor.unwrap_or("none")
        );
        self.get_with_retry("/products", &query, credentials).await
    }
}

#[async_trait]
impl FaireCatalogApi for FaireApiClient {
    async fn fetch_products_page(
        &self,
        credentials: &FaireCredentials,
        cursor: Option<&str>,
        limit: u32,
    ) -> Result<ProductsPage> {
        self.get_products_page(credentials, cursor, limit).await
    }
}
