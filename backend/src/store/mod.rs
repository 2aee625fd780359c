//! Weather record storage
//!
//! `WeatherRecordStore` answers every query from the hosted table when one is
//! configured and falls back to the local JSON file for any call the table
//! fails. Each result says which backend produced it.

mod local;

use std::path::PathBuf;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use shared::{
    validate_new_record, validate_patch, AvailableDates, DataSource, DateRange, NewWeatherRecord,
    QueryScope, RecordId, ValidationError, WeatherRecord, WeatherRecordPatch,
};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::external::{RemoteError, RemoteTableClient, RemoteTableConfig};

pub use local::LocalFileStore;

/// Storage settings resolved once at startup
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub data_file: PathBuf,
    /// Hosted table; local-only when `None`
    pub remote: Option<RemoteTableConfig>,
}

impl StoreConfig {
    pub fn local(data_file: impl Into<PathBuf>) -> Self {
        Self {
            data_file: data_file.into(),
            remote: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize weather data: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Configuration(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A store result tagged with the backend that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct Served<T> {
    pub data: T,
    pub source: DataSource,
}

impl<T> Served<T> {
    pub fn new(data: T, source: DataSource) -> Self {
        Self { data, source }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Upserted {
    pub record: WeatherRecord,
    /// `false` when an existing record for the date was overwritten
    pub created: bool,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageMode {
    Remote,
    Local,
}

/// Storage health as reported by `/api/health`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStatus {
    pub mode: StorageMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_table: Option<String>,
    pub local_records: usize,
    pub fallbacks: u64,
    pub last_fallback_at: Option<DateTime<Utc>>,
}

pub struct WeatherRecordStore {
    local: LocalFileStore,
    remote: Option<RemoteTableClient>,
    write_lock: Mutex<()>,
    fallbacks: AtomicU64,
    /// Unix millis of the last fallback, 0 when none
    last_fallback_ms: AtomicI64,
}

impl WeatherRecordStore {
    pub async fn open(config: StoreConfig) -> StoreResult<Self> {
        let local = LocalFileStore::open(&config.data_file).await?;

        let remote = match &config.remote {
            Some(remote_config) => {
                let client = RemoteTableClient::new(remote_config).map_err(|e| {
                    StoreError::Configuration(format!("Failed to build remote client: {}", e))
                })?;
                tracing::info!(
                    "Using remote table `{}` at {} with local fallback {}",
                    client.table(),
                    remote_config.base_url,
                    local.path().display()
                );
                Some(client)
            }
            None => {
                tracing::info!("Using local file storage at {}", local.path().display());
                None
            }
        };

        Ok(Self {
            local,
            remote,
            write_lock: Mutex::new(()),
            fallbacks: AtomicU64::new(0),
            last_fallback_ms: AtomicI64::new(0),
        })
    }

    pub async fn get_all(&self) -> Served<Vec<WeatherRecord>> {
        if let Some(remote) = &self.remote {
            match remote.list_all().await {
                Ok(records) => return Served::new(records, DataSource::Remote),
                Err(e) => self.record_fallback("get_all", &e),
            }
        }
        Served::new(self.local.all().await, self.local_source())
    }

    pub async fn get_by_date(&self, date: NaiveDate) -> Served<Option<WeatherRecord>> {
        if let Some(remote) = &self.remote {
            match remote.find_by_date(date).await {
                Ok(record) => return Served::new(record, DataSource::Remote),
                Err(e) => self.record_fallback("get_by_date", &e),
            }
        }
        Served::new(self.local.find_by_date(date).await, self.local_source())
    }

    pub async fn get_by_id(&self, id: &RecordId) -> Served<Option<WeatherRecord>> {
        if let Some(remote) = &self.remote {
            match remote.find_by_id(id).await {
                Ok(record) => return Served::new(record, DataSource::Remote),
                Err(e) => self.record_fallback("get_by_id", &e),
            }
        }
        Served::new(self.local.find_by_id(id).await, self.local_source())
    }

    pub async fn get_by_month(&self, year: i32, month: u32) -> StoreResult<Served<Vec<WeatherRecord>>> {
        let range = DateRange::month(year, month)?;
        Ok(self.get_range(range, "get_by_month").await)
    }

    pub async fn get_by_year(&self, year: i32) -> StoreResult<Served<Vec<WeatherRecord>>> {
        let range = DateRange::year(year)?;
        Ok(self.get_range(range, "get_by_year").await)
    }

    /// Records for a history or download scope
    pub async fn query(&self, scope: QueryScope) -> StoreResult<Served<Vec<WeatherRecord>>> {
        match scope {
            QueryScope::All => Ok(self.get_all().await),
            QueryScope::Year(year) => self.get_by_year(year).await,
            QueryScope::Month { year, month } => self.get_by_month(year, month).await,
        }
    }

    async fn get_range(&self, range: DateRange, operation: &str) -> Served<Vec<WeatherRecord>> {
        if let Some(remote) = &self.remote {
            match remote.list_range(range).await {
                Ok(records) => return Served::new(records, DataSource::Remote),
                Err(e) => self.record_fallback(operation, &e),
            }
        }
        Served::new(self.local.in_range(range).await, self.local_source())
    }

    pub async fn get_available_dates(&self) -> Served<AvailableDates> {
        if let Some(remote) = &self.remote {
            match remote.list_all().await {
                Ok(records) => {
                    return Served::new(AvailableDates::from_records(&records), DataSource::Remote)
                }
                Err(e) => self.record_fallback("get_available_dates", &e),
            }
        }
        Served::new(self.local.available_dates().await, self.local_source())
    }

    /// Always creates a new record, even when one exists for the same date
    pub async fn add(&self, input: NewWeatherRecord) -> StoreResult<Served<WeatherRecord>> {
        validate_new_record(&input)?;
        let _guard = self.write_lock.lock().await;
        let now = Utc::now();

        if let Some(remote) = &self.remote {
            match remote.insert(&input, now).await {
                Ok(record) => return Ok(Served::new(record, DataSource::Remote)),
                Err(e) => self.record_fallback("add", &e),
            }
        }
        let record = self.local.insert(input, now).await?;
        Ok(Served::new(record, self.local_source()))
    }

    pub async fn update(
        &self,
        id: &RecordId,
        patch: WeatherRecordPatch,
    ) -> StoreResult<Served<Option<WeatherRecord>>> {
        validate_patch(&patch)?;
        let _guard = self.write_lock.lock().await;
        let now = Utc::now();

        if let Some(remote) = &self.remote {
            match remote.update(id, &patch, now).await {
                Ok(record) => return Ok(Served::new(record, DataSource::Remote)),
                Err(e) => self.record_fallback("update", &e),
            }
        }
        let record = self.local.update(id, &patch, now).await?;
        Ok(Served::new(record, self.local_source()))
    }

    pub async fn delete(&self, id: &RecordId) -> StoreResult<Served<bool>> {
        let _guard = self.write_lock.lock().await;

        if let Some(remote) = &self.remote {
            match remote.delete(id).await {
                Ok(deleted) => return Ok(Served::new(deleted, DataSource::Remote)),
                Err(e) => self.record_fallback("delete", &e),
            }
        }
        let deleted = self.local.delete(id).await?;
        Ok(Served::new(deleted, self.local_source()))
    }

    /// Overwrite the record for the input's date, or create one.
    ///
    /// The lookup and the write happen under the store's write lock, so two
    /// concurrent submissions for one date cannot both insert.
    pub async fn upsert_by_date(&self, input: NewWeatherRecord) -> StoreResult<Served<Upserted>> {
        validate_new_record(&input)?;
        let _guard = self.write_lock.lock().await;
        let now = Utc::now();

        if let Some(remote) = &self.remote {
            match remote_upsert(remote, &input, now).await {
                Ok(upserted) => return Ok(Served::new(upserted, DataSource::Remote)),
                Err(e) => self.record_fallback("upsert_by_date", &e),
            }
        }
        let (record, created) = self.local.upsert_by_date(input, now).await?;
        Ok(Served::new(Upserted { record, created }, self.local_source()))
    }

    /// Snapshot of the local copy next to the data file
    pub async fn create_backup(&self) -> StoreResult<PathBuf> {
        let _guard = self.write_lock.lock().await;
        self.local.backup(Utc::now()).await
    }

    /// Records in the local copy
    pub async fn count(&self) -> usize {
        self.local.len().await
    }

    pub async fn status(&self) -> StoreStatus {
        let last_ms = self.last_fallback_ms.load(Ordering::Relaxed);
        StoreStatus {
            mode: if self.remote.is_some() {
                StorageMode::Remote
            } else {
                StorageMode::Local
            },
            remote_table: self.remote.as_ref().map(|r| r.table().to_string()),
            local_records: self.local.len().await,
            fallbacks: self.fallbacks.load(Ordering::Relaxed),
            last_fallback_at: (last_ms > 0)
                .then(|| DateTime::from_timestamp_millis(last_ms))
                .flatten(),
        }
    }

    fn local_source(&self) -> DataSource {
        if self.remote.is_some() {
            DataSource::LocalFallback
        } else {
            DataSource::Local
        }
    }

    fn record_fallback(&self, operation: &str, error: &RemoteError) {
        let total = self.fallbacks.fetch_add(1, Ordering::Relaxed) + 1;
        self.last_fallback_ms
            .store(Utc::now().timestamp_millis(), Ordering::Relaxed);
        tracing::error!(
            operation,
            fallbacks = total,
            "Remote storage failed, using local file: {}",
            error
        );
    }
}

async fn remote_upsert(
    remote: &RemoteTableClient,
    input: &NewWeatherRecord,
    now: DateTime<Utc>,
) -> Result<Upserted, RemoteError> {
    if let Some(existing) = remote.find_by_date(input.date).await? {
        if let Some(record) = remote.update(&existing.id, &input.as_patch(), now).await? {
            return Ok(Upserted {
                record,
                created: false,
            });
        }
    }
    let record = remote.insert(input, now).await?;
    Ok(Upserted {
        record,
        created: true,
    })
}
