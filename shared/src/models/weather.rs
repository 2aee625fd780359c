//! Weather record models

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::validation::ValidationError;

/// Opaque record identifier.
///
/// Remote tables may hand back numeric ids, so both JSON strings and numbers
/// are accepted and kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(id) => Self(id),
            RawId::Signed(id) => Self(id.to_string()),
            RawId::Unsigned(id) => Self(id.to_string()),
        })
    }
}

/// One day's observation at the station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherRecord {
    pub id: RecordId,
    pub date: NaiveDate,
    /// Rainfall in millimetres
    #[serde(with = "rust_decimal::serde::float")]
    pub rainfall: Decimal,
    /// Maximum temperature in °C
    #[serde(with = "rust_decimal::serde::float")]
    pub max_temperature: Decimal,
    /// Minimum temperature in °C
    #[serde(with = "rust_decimal::serde::float")]
    pub min_temperature: Decimal,
    /// Relative humidity in percent
    #[serde(with = "rust_decimal::serde::float")]
    pub humidity: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WeatherRecord {
    /// Build a freshly created record; both timestamps are `now`
    pub fn create(id: RecordId, input: NewWeatherRecord, now: DateTime<Utc>) -> Self {
        Self {
            id,
            date: input.date,
            rainfall: input.rainfall,
            max_temperature: input.max_temperature,
            min_temperature: input.min_temperature,
            humidity: input.humidity,
            created_at: now,
            updated_at: now,
        }
    }

    /// Return a copy with the patch applied and `updated_at` refreshed.
    ///
    /// `id` and `created_at` are never touched. `updated_at` never moves
    /// backwards, even if the wall clock does.
    pub fn merged(&self, patch: &WeatherRecordPatch, now: DateTime<Utc>) -> Self {
        Self {
            id: self.id.clone(),
            date: patch.date.unwrap_or(self.date),
            rainfall: patch.rainfall.unwrap_or(self.rainfall),
            max_temperature: patch.max_temperature.unwrap_or(self.max_temperature),
            min_temperature: patch.min_temperature.unwrap_or(self.min_temperature),
            humidity: patch.humidity.unwrap_or(self.humidity),
            created_at: self.created_at,
            updated_at: now.max(self.updated_at),
        }
    }
}

/// Fields required to create a record; id and timestamps are assigned by storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWeatherRecord {
    pub date: NaiveDate,
    #[serde(with = "rust_decimal::serde::float")]
    pub rainfall: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub max_temperature: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub min_temperature: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub humidity: Decimal,
}

impl NewWeatherRecord {
    /// Patch that overwrites every measurement, keeping the date
    pub fn as_patch(&self) -> WeatherRecordPatch {
        WeatherRecordPatch {
            date: None,
            rainfall: Some(self.rainfall),
            max_temperature: Some(self.max_temperature),
            min_temperature: Some(self.min_temperature),
            humidity: Some(self.humidity),
        }
    }
}

/// Partial update; absent fields keep their stored value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherRecordPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub rainfall: Option<Decimal>,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_temperature: Option<Decimal>,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub min_temperature: Option<Decimal>,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub humidity: Option<Decimal>,
}

impl WeatherRecordPatch {
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.rainfall.is_none()
            && self.max_temperature.is_none()
            && self.min_temperature.is_none()
            && self.humidity.is_none()
    }
}

/// Raw manual-entry form submission.
///
/// Every field is optional so that missing input can be reported with a
/// readable message instead of a deserialisation failure. Numbers may arrive
/// as JSON numbers or numeric strings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherEntryForm {
    pub date: Option<NaiveDate>,
    pub rainfall: Option<Decimal>,
    pub max_temperature: Option<Decimal>,
    pub min_temperature: Option<Decimal>,
    pub humidity: Option<Decimal>,
}

impl WeatherEntryForm {
    /// Convert into a record input, requiring every field and checking ranges
    pub fn into_new_record(self) -> Result<NewWeatherRecord, ValidationError> {
        match (
            self.date,
            self.rainfall,
            self.max_temperature,
            self.min_temperature,
            self.humidity,
        ) {
            (Some(date), Some(rainfall), Some(max_temperature), Some(min_temperature), Some(humidity)) => {
                let record = NewWeatherRecord {
                    date,
                    rainfall,
                    max_temperature,
                    min_temperature,
                    humidity,
                };
                crate::validation::validate_new_record(&record)?;
                Ok(record)
            }
            _ => Err(ValidationError::general("All fields are required")),
        }
    }
}

/// Seed records written when the local data file is missing or unreadable
pub fn default_records() -> Vec<WeatherRecord> {
    fn seed(id: &str, (y, m, d): (i32, u32, u32), readings: [(i64, u32); 4]) -> Option<WeatherRecord> {
        let date = NaiveDate::from_ymd_opt(y, m, d)?;
        let stamp = date.and_hms_opt(6, 0, 0)?.and_utc();
        let [rainfall, max_temperature, min_temperature, humidity] =
            readings.map(|(mantissa, scale)| Decimal::new(mantissa, scale));
        Some(WeatherRecord {
            id: RecordId::from(id),
            date,
            rainfall,
            max_temperature,
            min_temperature,
            humidity,
            created_at: stamp,
            updated_at: stamp,
        })
    }

    [
        seed("1", (2025, 1, 15), [(125, 1), (321, 1), (248, 1), (78, 0)]),
        seed("2", (2025, 1, 14), [(82, 1), (315, 1), (253, 1), (75, 0)]),
    ]
    .into_iter()
    .flatten()
    .collect()
}
