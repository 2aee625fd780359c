//! JSON file backend
//!
//! The whole record set lives in memory and is rewritten to disk after every
//! mutation. A second process writing the same file is not detected.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use shared::{
    default_records, validate_record, AvailableDates, DateRange, NewWeatherRecord, RecordId,
    WeatherRecord, WeatherRecordPatch,
};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StoreError, StoreResult};

/// Local copy of the station's records
pub struct LocalFileStore {
    path: PathBuf,
    records: RwLock<Vec<WeatherRecord>>,
}

impl LocalFileStore {
    /// Open the data file, seeding it when it is missing or unreadable
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|source| StoreError::Io {
                    path: dir.to_path_buf(),
                    source,
                })?;
        }

        let records = match load_records(&path).await {
            Some(records) => {
                tracing::info!(
                    "Loaded {} weather records from {}",
                    records.len(),
                    path.display()
                );
                records
            }
            None => {
                let seed = default_records();
                if let Err(e) = write_records(&path, &seed).await {
                    tracing::error!("Failed to write seed data to {}: {}", path.display(), e);
                }
                seed
            }
        };

        Ok(Self {
            path,
            records: RwLock::new(records),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn all(&self) -> Vec<WeatherRecord> {
        self.records.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn find_by_date(&self, date: NaiveDate) -> Option<WeatherRecord> {
        self.records
            .read()
            .await
            .iter()
            .find(|r| r.date == date)
            .cloned()
    }

    pub async fn find_by_id(&self, id: &RecordId) -> Option<WeatherRecord> {
        self.records
            .read()
            .await
            .iter()
            .find(|r| &r.id == id)
            .cloned()
    }

    /// Records inside `range`, most recent first
    pub async fn in_range(&self, range: DateRange) -> Vec<WeatherRecord> {
        let mut matching: Vec<WeatherRecord> = self
            .records
            .read()
            .await
            .iter()
            .filter(|r| range.contains(r.date))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.date.cmp(&a.date));
        matching
    }

    pub async fn available_dates(&self) -> AvailableDates {
        AvailableDates::from_records(self.records.read().await.iter())
    }

    /// Append a new record with a fresh UUID
    pub async fn insert(
        &self,
        input: NewWeatherRecord,
        now: DateTime<Utc>,
    ) -> StoreResult<WeatherRecord> {
        let mut records = self.records.write().await;
        let record = WeatherRecord::create(RecordId::new(Uuid::new_v4().to_string()), input, now);

        let mut next = records.clone();
        next.push(record.clone());
        self.commit(&mut records, next).await?;

        Ok(record)
    }

    /// Merge `patch` into the record with `id`; `None` when it does not exist
    pub async fn update(
        &self,
        id: &RecordId,
        patch: &WeatherRecordPatch,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<WeatherRecord>> {
        let mut records = self.records.write().await;
        let Some(index) = records.iter().position(|r| &r.id == id) else {
            return Ok(None);
        };

        let updated = records[index].merged(patch, now);
        validate_record(&updated)?;

        let mut next = records.clone();
        next[index] = updated.clone();
        self.commit(&mut records, next).await?;

        Ok(Some(updated))
    }

    /// Update the record for `input.date` or insert one. The flag is `true`
    /// when a record was created.
    pub async fn upsert_by_date(
        &self,
        input: NewWeatherRecord,
        now: DateTime<Utc>,
    ) -> StoreResult<(WeatherRecord, bool)> {
        let mut records = self.records.write().await;
        let mut next = records.clone();

        let result = match next.iter().position(|r| r.date == input.date) {
            Some(index) => {
                let updated = next[index].merged(&input.as_patch(), now);
                next[index] = updated.clone();
                (updated, false)
            }
            None => {
                let created =
                    WeatherRecord::create(RecordId::new(Uuid::new_v4().to_string()), input, now);
                next.push(created.clone());
                (created, true)
            }
        };

        self.commit(&mut records, next).await?;
        Ok(result)
    }

    /// Remove the record with `id`; `false` when nothing matched
    pub async fn delete(&self, id: &RecordId) -> StoreResult<bool> {
        let mut records = self.records.write().await;
        let next: Vec<WeatherRecord> = records.iter().filter(|r| &r.id != id).cloned().collect();
        if next.len() == records.len() {
            return Ok(false);
        }

        self.commit(&mut records, next).await?;
        Ok(true)
    }

    /// Write the current set to a timestamped file next to the data file
    pub async fn backup(&self, now: DateTime<Utc>) -> StoreResult<PathBuf> {
        let records = self.records.read().await;
        let file_name = format!(
            "weather-data-backup-{}.json",
            now.format("%Y-%m-%dT%H-%M-%S-%3fZ")
        );
        let target = match self.path.parent() {
            Some(dir) => dir.join(file_name),
            None => PathBuf::from(file_name),
        };

        write_records(&target, &records).await?;
        tracing::info!("Backup created: {}", target.display());
        Ok(target)
    }

    /// Persist `next` and only then make it visible in memory
    async fn commit(
        &self,
        current: &mut Vec<WeatherRecord>,
        next: Vec<WeatherRecord>,
    ) -> StoreResult<()> {
        write_records(&self.path, &next).await?;
        *current = next;
        Ok(())
    }
}

/// `None` means the caller should fall back to the seed data
async fn load_records(path: &Path) -> Option<Vec<WeatherRecord>> {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!(
                "Weather data file {} not found, creating it with default data",
                path.display()
            );
            return None;
        }
        Err(e) => {
            tracing::error!("Failed to read weather data file {}: {}", path.display(), e);
            return None;
        }
    };

    match serde_json::from_str::<Vec<WeatherRecord>>(&contents) {
        Ok(records) => Some(records),
        Err(e) => {
            tracing::warn!(
                "Weather data file {} is malformed ({}), replacing it with default data",
                path.display(),
                e
            );
            preserve_corrupt_file(path).await;
            None
        }
    }
}

/// Keep a copy of an unreadable data file before the seed overwrites it
async fn preserve_corrupt_file(path: &Path) {
    let mut target = path.as_os_str().to_owned();
    target.push(format!(".corrupt-{}", Utc::now().format("%Y%m%dT%H%M%S")));
    let target = PathBuf::from(target);

    match tokio::fs::copy(path, &target).await {
        Ok(_) => tracing::warn!("Malformed data kept at {}", target.display()),
        Err(e) => tracing::error!("Failed to keep malformed data file: {}", e),
    }
}

/// Pretty-printed JSON written to a sibling temp file, then renamed over `path`
async fn write_records(path: &Path, records: &[WeatherRecord]) -> StoreResult<()> {
    let json = serde_json::to_string_pretty(records)?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, json)
        .await
        .map_err(|source| StoreError::Io {
            path: tmp.clone(),
            source,
        })?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use tempfile::TempDir;

    fn reading(date: &str, min: i64, max: i64) -> NewWeatherRecord {
        NewWeatherRecord {
            date: date.parse().unwrap(),
            rainfall: Decimal::new(35, 1),
            max_temperature: Decimal::from(max),
            min_temperature: Decimal::from(min),
            humidity: Decimal::from(70),
        }
    }

    async fn open_in(dir: &TempDir) -> LocalFileStore {
        LocalFileStore::open(dir.path().join("weather-data.json"))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_missing_file_is_seeded_and_written() {
        let dir = TempDir::new().unwrap();
        let store = open_in(&dir).await;

        assert_eq!(store.len().await, 2);
        let on_disk = std::fs::read_to_string(dir.path().join("weather-data.json")).unwrap();
        let parsed: Vec<WeatherRecord> = serde_json::from_str(&on_disk).unwrap();
        assert_eq!(parsed.len(), 2);
    }

    #[tokio::test]
    async fn test_nested_data_dir_is_created() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("station").join("data").join("weather-data.json");
        let store = LocalFileStore::open(&path).await.unwrap();
        assert_eq!(store.len().await, 2);
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_malformed_file_is_replaced_and_kept() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("weather-data.json");
        std::fs::write(&path, "{\"not\": \"an array\"}").unwrap();

        let store = LocalFileStore::open(&path).await.unwrap();
        assert_eq!(store.len().await, 2);

        let kept = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .any(|e| e.file_name().to_string_lossy().contains(".corrupt-"));
        assert!(kept);
    }

    #[tokio::test]
    async fn test_insert_assigns_uuid() {
        let dir = TempDir::new().unwrap();
        let store = open_in(&dir).await;

        let record = store.insert(reading("2025-03-01", 20, 30), Utc::now()).await.unwrap();
        assert!(Uuid::parse_str(record.id.as_str()).is_ok());
        assert_eq!(record.created_at, record.updated_at);
        assert_eq!(store.len().await, 3);
    }

    #[tokio::test]
    async fn test_update_rejects_inverted_merge() {
        let dir = TempDir::new().unwrap();
        let store = open_in(&dir).await;

        // Seed record "1" has max 32.1
        let patch = WeatherRecordPatch {
            min_temperature: Some(Decimal::from(40)),
            ..Default::default()
        };
        let result = store.update(&RecordId::from("1"), &patch, Utc::now()).await;
        assert!(matches!(result, Err(StoreError::Validation(_))));

        let unchanged = store.find_by_id(&RecordId::from("1")).await.unwrap();
        assert_eq!(unchanged.min_temperature, Decimal::new(248, 1));
    }

    #[tokio::test]
    async fn test_update_unknown_id() {
        let dir = TempDir::new().unwrap();
        let store = open_in(&dir).await;
        let patch = WeatherRecordPatch {
            humidity: Some(Decimal::from(50)),
            ..Default::default()
        };
        let result = store.update(&RecordId::from("missing"), &patch, Utc::now()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_upsert_updates_existing_date() {
        let dir = TempDir::new().unwrap();
        let store = open_in(&dir).await;

        let (record, created) = store
            .upsert_by_date(reading("2025-01-15", 21, 29), Utc::now())
            .await
            .unwrap();
        assert!(!created);
        assert_eq!(record.id.as_str(), "1");
        assert_eq!(record.max_temperature, Decimal::from(29));
        assert_eq!(store.len().await, 2);

        let (_, created) = store
            .upsert_by_date(reading("2025-01-16", 21, 29), Utc::now())
            .await
            .unwrap();
        assert!(created);
        assert_eq!(store.len().await, 3);
    }

    #[tokio::test]
    async fn test_delete() {
        let dir = TempDir::new().unwrap();
        let store = open_in(&dir).await;

        assert!(store.delete(&RecordId::from("2")).await.unwrap());
        assert!(!store.delete(&RecordId::from("2")).await.unwrap());
        assert!(store.find_by_id(&RecordId::from("2")).await.is_none());
    }

    #[tokio::test]
    async fn test_backup_file_name() {
        let dir = TempDir::new().unwrap();
        let store = open_in(&dir).await;
        let now = "2025-01-15T06:30:05.123Z".parse::<DateTime<Utc>>().unwrap();

        let path = store.backup(now).await.unwrap();
        assert_eq!(
            path.file_name().unwrap().to_string_lossy(),
            "weather-data-backup-2025-01-15T06-30-05-123Z.json"
        );
        let parsed: Vec<WeatherRecord> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.len(), 2);
    }

    #[tokio::test]
    async fn test_in_range_sorted_desc() {
        let dir = TempDir::new().unwrap();
        let store = open_in(&dir).await;
        let range = DateRange::month(2025, 1).unwrap();

        let records = store.in_range(range).await;
        let dates: Vec<String> = records.iter().map(|r| r.date.to_string()).collect();
        assert_eq!(dates, vec!["2025-01-15", "2025-01-14"]);
    }
}
