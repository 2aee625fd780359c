//! Dashboard summary: the latest reading compared with the day before

use chrono::NaiveDate;
use shared::{previous_day, DailyWeatherDisplay, WeatherResponse};

use crate::error::{AppError, AppResult};
use crate::store::WeatherRecordStore;

/// Summary for `today`, or for the most recent reading when today has none
pub async fn today_summary(
    store: &WeatherRecordStore,
    today: NaiveDate,
) -> AppResult<WeatherResponse> {
    let todays = store.get_by_date(today).await;
    let mut source = todays.source;

    let current = match todays.data {
        Some(record) => record,
        None => {
            let all = store.get_all().await;
            source = source.combine(all.source);
            all.data
                .into_iter()
                .max_by_key(|r| r.date)
                .ok_or_else(|| AppError::NotFound("Weather data".to_string()))?
        }
    };

    let previous = match previous_day(current.date) {
        Some(date) => {
            let served = store.get_by_date(date).await;
            source = source.combine(served.source);
            served.data
        }
        None => None,
    };

    Ok(WeatherResponse {
        today: DailyWeatherDisplay::between(&current, previous.as_ref()),
        last_updated: current.updated_at,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreConfig;
    use shared::{ChangeType, DataSource, RecordId};
    use tempfile::TempDir;

    async fn seeded_store(dir: &TempDir) -> WeatherRecordStore {
        WeatherRecordStore::open(StoreConfig::local(dir.path().join("weather-data.json")))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_today_with_previous_day() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir).await;

        let summary = today_summary(&store, "2025-01-15".parse().unwrap()).await.unwrap();
        assert_eq!(summary.today.date.to_string(), "2025-01-15");
        assert_eq!(summary.source, DataSource::Local);
        // 12.5mm against 8.2mm the day before
        assert_eq!(summary.today.rainfall.change_type, ChangeType::Increase);
        assert_eq!(summary.today.rainfall.change_text("mm"), "+4.3mm");
        // 24.8°C against 25.3°C
        assert_eq!(summary.today.min_temperature.change_type, ChangeType::Decrease);
    }

    #[tokio::test]
    async fn test_falls_back_to_latest_reading() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir).await;

        let summary = today_summary(&store, "2025-06-01".parse().unwrap()).await.unwrap();
        assert_eq!(summary.today.date.to_string(), "2025-01-15");
        assert!(summary.today.humidity.previous.is_some());
    }

    #[tokio::test]
    async fn test_no_previous_day_is_neutral() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir).await;
        store.delete(&RecordId::from("1")).await.unwrap();

        let summary = today_summary(&store, "2025-01-14".parse().unwrap()).await.unwrap();
        assert!(summary.today.rainfall.previous.is_none());
        assert_eq!(summary.today.rainfall.change_type, ChangeType::Neutral);
    }

    #[tokio::test]
    async fn test_empty_store_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir).await;
        store.delete(&RecordId::from("1")).await.unwrap();
        store.delete(&RecordId::from("2")).await.unwrap();

        let result = today_summary(&store, "2025-01-15".parse().unwrap()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
