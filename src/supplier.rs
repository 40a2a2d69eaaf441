// Catalog suppliers: where the accommodation listing comes from
//
// The engine only ever sees parsed `AccommodationUnit`s. Transport, retries and
// feed validation all live here.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::AccommodationUnit;

pub const DEFAULT_CATALOG_URL: &str = "https://api.adriatic.hr/test/accommodation";

#[derive(Error, Debug)]
pub enum SupplierError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    #[error("Catalog endpoint returned {status_code}")]
    Status { status_code: u16, is_retryable: bool },

    #[error("Catalog parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SupplierError {
    pub fn is_retryable(&self) -> bool {
        match self {
            SupplierError::Network(_) | SupplierError::Timeout(_) => true,
            SupplierError::Status { is_retryable, .. } => *is_retryable,
            SupplierError::Parse(_) | SupplierError::Io(_) => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub backoff_multiplier: f64,
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 100,
            max_backoff_ms: 10000,
            backoff_multiplier: 2.0,
            jitter_factor: 0.1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SupplierConfig {
    pub url: String,
    pub timeout_ms: u64,
    pub retry_config: RetryConfig,
    // Drop units that fail validation instead of only logging them
    pub drop_invalid_units: bool,
}

impl Default for SupplierConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_CATALOG_URL.to_string(),
            timeout_ms: 10000,
            retry_config: RetryConfig::default(),
            drop_invalid_units: false,
        }
    }
}

#[async_trait]
pub trait CatalogSupplier: Send + Sync {
    async fn fetch_catalog(&self) -> Result<Vec<AccommodationUnit>, SupplierError>;

    fn source_name(&self) -> &str;
}

#[async_trait]
impl<T: CatalogSupplier + ?Sized> CatalogSupplier for Box<T> {
    async fn fetch_catalog(&self) -> Result<Vec<AccommodationUnit>, SupplierError> {
        (**self).fetch_catalog().await
    }

    fn source_name(&self) -> &str {
        (**self).source_name()
    }
}

/// Parse the listing JSON: a top-level array of units.
pub fn parse_catalog(json: &str) -> Result<Vec<AccommodationUnit>, SupplierError> {
    serde_json::from_str(json).map_err(|e| SupplierError::Parse(e.to_string()))
}

/// Log every validation issue and optionally drop the offending units.
pub fn screen_catalog(
    units: Vec<AccommodationUnit>,
    drop_invalid_units: bool,
) -> Vec<AccommodationUnit> {
    units
        .into_iter()
        .filter(|unit| match unit.validate() {
            Ok(()) => true,
            Err(issues) => {
                for issue in &issues {
                    tracing::warn!(unit_id = %unit.id, %issue, "catalog unit failed validation");
                }
                !drop_invalid_units
            }
        })
        .collect()
}

// Exponential backoff with jitter
pub fn calculate_backoff(retry_attempt: u32, config: &RetryConfig) -> Duration {
    let base_backoff_ms = (config.initial_backoff_ms as f64
        * config.backoff_multiplier.powf(retry_attempt as f64))
    .min(config.max_backoff_ms as f64);

    let jitter = rand::random::<f64>() * config.jitter_factor * base_backoff_ms;
    let backoff_ms = base_backoff_ms * (1.0 - config.jitter_factor / 2.0) + jitter;

    Duration::from_millis(backoff_ms as u64)
}

pub struct HttpCatalogSupplier {
    client: reqwest::Client,
    config: SupplierConfig,
}

impl HttpCatalogSupplier {
    pub fn new(config: SupplierConfig) -> Result<Self, SupplierError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| SupplierError::Network(e.to_string()))?;
        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: reqwest::Client, config: SupplierConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &SupplierConfig {
        &self.config
    }

    async fn fetch_once(&self) -> Result<Vec<AccommodationUnit>, SupplierError> {
        let response = self
            .client
            .get(&self.config.url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SupplierError::Status {
                status_code: status.as_u16(),
                is_retryable: status.is_server_error()
                    || status == reqwest::StatusCode::TOO_MANY_REQUESTS,
            });
        }

        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        parse_catalog(&body)
    }

    fn transport_error(&self, error: reqwest::Error) -> SupplierError {
        if error.is_timeout() {
            SupplierError::Timeout(self.config.timeout_ms)
        } else {
            SupplierError::Network(error.to_string())
        }
    }
}

#[async_trait]
impl CatalogSupplier for HttpCatalogSupplier {
    async fn fetch_catalog(&self) -> Result<Vec<AccommodationUnit>, SupplierError> {
        let retry = &self.config.retry_config;
        let mut attempt = 0;

        loop {
            match self.fetch_once().await {
                Ok(units) => {
                    tracing::info!(url = %self.config.url, units = units.len(), attempt, "fetched catalog");
                    return Ok(screen_catalog(units, self.config.drop_invalid_units));
                }
                Err(err) if err.is_retryable() && attempt < retry.max_retries => {
                    let backoff = calculate_backoff(attempt, retry);
                    tracing::warn!(
                        url = %self.config.url,
                        error = %err,
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        "catalog fetch failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(err) => {
                    tracing::error!(url = %self.config.url, error = %err, attempt, "catalog fetch failed");
                    return Err(err);
                }
            }
        }
    }

    fn source_name(&self) -> &str {
        &self.config.url
    }
}

// Reads the listing JSON from disk
pub struct FileCatalogSupplier {
    path: PathBuf,
    drop_invalid_units: bool,
}

impl FileCatalogSupplier {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            drop_invalid_units: false,
        }
    }

    pub fn dropping_invalid_units(mut self, drop_invalid_units: bool) -> Self {
        self.drop_invalid_units = drop_invalid_units;
        self
    }
}

#[async_trait]
impl CatalogSupplier for FileCatalogSupplier {
    async fn fetch_catalog(&self) -> Result<Vec<AccommodationUnit>, SupplierError> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let units = parse_catalog(&content)?;
        tracing::info!(path = %self.path.display(), units = units.len(), "loaded catalog file");
        Ok(screen_catalog(units, self.drop_invalid_units))
    }

    fn source_name(&self) -> &str {
        self.path.to_str().unwrap_or("catalog file")
    }
}

// Serves a fixed in-memory catalog
pub struct StaticCatalogSupplier {
    units: Vec<AccommodationUnit>,
}

impl StaticCatalogSupplier {
    pub fn new(units: Vec<AccommodationUnit>) -> Self {
        Self { units }
    }
}

#[async_trait]
impl CatalogSupplier for StaticCatalogSupplier {
    async fn fetch_catalog(&self) -> Result<Vec<AccommodationUnit>, SupplierError> {
        Ok(self.units.clone())
    }

    fn source_name(&self) -> &str {
        "static"
    }
}
