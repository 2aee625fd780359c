//! Request and response payloads shared with the browser client

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use super::{DailyWeatherDisplay, RecordId, WeatherRecord};
use crate::types::DataSource;

/// Years and months that have at least one record
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AvailableDates {
    /// Most recent first
    pub years: Vec<i32>,
    /// Months per year, ascending
    pub months: BTreeMap<i32, Vec<u32>>,
    pub total_records: usize,
}

impl AvailableDates {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a WeatherRecord>) -> Self {
        let mut grouped: BTreeMap<i32, BTreeSet<u32>> = BTreeMap::new();
        let mut total_records = 0;

        for record in records {
            total_records += 1;
            grouped
                .entry(record.date.year())
                .or_default()
                .insert(record.date.month());
        }

        Self {
            years: grouped.keys().rev().copied().collect(),
            months: grouped
                .into_iter()
                .map(|(year, months)| (year, months.into_iter().collect()))
                .collect(),
            total_records,
        }
    }
}

/// Dashboard payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherResponse {
    pub today: DailyWeatherDisplay,
    pub last_updated: DateTime<Utc>,
    pub source: DataSource,
}

/// History table payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherHistoryResponse {
    pub data: Vec<WeatherRecord>,
    pub total: usize,
    pub page: u32,
    pub limit: usize,
    pub source: DataSource,
}

impl WeatherHistoryResponse {
    /// Single page holding every record
    pub fn single_page(data: Vec<WeatherRecord>, source: DataSource) -> Self {
        let total = data.len();
        Self {
            data,
            total,
            page: 1,
            limit: total,
            source,
        }
    }
}

/// Result of a manual entry submission
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveWeatherResponse {
    pub success: bool,
    pub message: String,
    pub id: RecordId,
    /// False when an existing record for the date was updated
    pub created: bool,
}

/// JSON download body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub export_date: DateTime<Utc>,
    pub total_records: usize,
    pub data: Vec<WeatherRecord>,
}
