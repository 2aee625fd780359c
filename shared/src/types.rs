//! Common types used across the station software

use std::fmt;

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::validation::ValidationError;

/// Earliest year accepted in range queries
pub const MIN_YEAR: i32 = 1900;
/// Latest year accepted in range queries
pub const MAX_YEAR: i32 = 9999;

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Inclusive calendar date range
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Every day of `month` in `year`, using the real month length
    pub fn month(year: i32, month: u32) -> Result<Self, ValidationError> {
        check_year(year)?;
        if !(1..=12).contains(&month) {
            return Err(ValidationError::new("month", "Month must be between 1 and 12"));
        }

        let start = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| ValidationError::new("month", "Invalid calendar month"))?;
        let end = start
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .ok_or_else(|| ValidationError::new("month", "Invalid calendar month"))?;

        Ok(Self { start, end })
    }

    /// January 1st through December 31st of `year`
    pub fn year(year: i32) -> Result<Self, ValidationError> {
        check_year(year)?;
        let start = NaiveDate::from_ymd_opt(year, 1, 1);
        let end = NaiveDate::from_ymd_opt(year, 12, 31);
        match (start, end) {
            (Some(start), Some(end)) => Ok(Self { start, end }),
            _ => Err(ValidationError::new("year", "Invalid calendar year")),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

fn check_year(year: i32) -> Result<(), ValidationError> {
    if (MIN_YEAR..=MAX_YEAR).contains(&year) {
        Ok(())
    } else {
        Err(ValidationError::new(
            "year",
            format!("Year must be between {} and {}", MIN_YEAR, MAX_YEAR),
        ))
    }
}

/// Which slice of the history a query covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryScope {
    All,
    Year(i32),
    Month { year: i32, month: u32 },
}

impl QueryScope {
    /// Month without a year is ignored, matching the history filter UI
    pub fn from_parts(year: Option<i32>, month: Option<u32>) -> Self {
        match (year, month) {
            (Some(year), Some(month)) => Self::Month { year, month },
            (Some(year), None) => Self::Year(year),
            (None, _) => Self::All,
        }
    }

    pub fn range(&self) -> Result<Option<DateRange>, ValidationError> {
        match *self {
            Self::All => Ok(None),
            Self::Year(year) => DateRange::year(year).map(Some),
            Self::Month { year, month } => DateRange::month(year, month).map(Some),
        }
    }

    /// Download file name without extension
    pub fn file_stem(&self) -> String {
        match *self {
            Self::All => "weather-data-all".to_string(),
            Self::Year(year) => format!("weather-data-{}", year),
            Self::Month { year, month } => format!("weather-data-{}-{:02}", year, month),
        }
    }

    /// Caption shown above the history table
    pub fn description(&self) -> String {
        match *self {
            Self::All => "All Data".to_string(),
            Self::Year(year) => format!("Year {}", year),
            Self::Month { year, month } => match month_name(month) {
                Some(name) => format!("{} {}", name, year),
                None => format!("Year {}", year),
            },
        }
    }
}

pub fn month_name(month: u32) -> Option<&'static str> {
    let index = usize::try_from(month).ok()?.checked_sub(1)?;
    MONTH_NAMES.get(index).copied()
}

/// Backend that produced a store result
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum DataSource {
    Remote,
    Local,
    /// Remote is configured but failed; the local copy answered instead
    LocalFallback,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Remote => "remote",
            DataSource::Local => "local",
            DataSource::LocalFallback => "local-fallback",
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, DataSource::LocalFallback)
    }

    /// Source to report for a response assembled from several store calls.
    /// Any fallback taints the whole response.
    pub fn combine(self, other: DataSource) -> DataSource {
        if self.is_fallback() || other.is_fallback() {
            DataSource::LocalFallback
        } else {
            self
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Download formats
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

impl ExportFormat {
    /// Anything other than "csv" (case-insensitive) downloads JSON
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.trim().eq_ignore_ascii_case("csv") => ExportFormat::Csv,
            _ => ExportFormat::Json,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv",
        }
    }
}

/// Calendar day before `date`
pub fn previous_day(date: NaiveDate) -> Option<NaiveDate> {
    date.pred_opt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_february_non_leap() {
        let range = DateRange::month(2025, 2).unwrap();
        assert_eq!(range.start, date(2025, 2, 1));
        assert_eq!(range.end, date(2025, 2, 28));
        assert!(!range.contains(date(2025, 1, 31)));
        assert!(!range.contains(date(2025, 3, 1)));
        assert_eq!(range.days(), 28);
    }

    #[test]
    fn test_february_leap() {
        let range = DateRange::month(2024, 2).unwrap();
        assert_eq!(range.end, date(2024, 2, 29));
        assert!(range.contains(date(2024, 2, 29)));
    }

    #[test]
    fn test_thirty_day_and_december_months() {
        assert_eq!(DateRange::month(2025, 4).unwrap().end, date(2025, 4, 30));
        let december = DateRange::month(2025, 12).unwrap();
        assert_eq!(december.end, date(2025, 12, 31));
        assert!(!december.contains(date(2026, 1, 1)));
    }

    #[test]
    fn test_invalid_month_rejected() {
        assert!(DateRange::month(2025, 0).is_err());
        assert!(DateRange::month(2025, 13).is_err());
        assert_eq!(DateRange::month(2025, 13).unwrap_err().field.as_deref(), Some("month"));
    }

    #[test]
    fn test_year_range() {
        let range = DateRange::year(2024).unwrap();
        assert_eq!(range.days(), 366);
        assert!(range.contains(date(2024, 12, 31)));
        assert!(!range.contains(date(2025, 1, 1)));
        assert!(DateRange::year(12).is_err());
    }

    #[test]
    fn test_scope_from_parts() {
        assert_eq!(QueryScope::from_parts(None, Some(3)), QueryScope::All);
        assert_eq!(QueryScope::from_parts(Some(2025), None), QueryScope::Year(2025));
        assert_eq!(
            QueryScope::from_parts(Some(2025), Some(3)),
            QueryScope::Month { year: 2025, month: 3 }
        );
    }

    #[test]
    fn test_scope_file_stem_and_description() {
        let month = QueryScope::Month { year: 2025, month: 3 };
        assert_eq!(month.file_stem(), "weather-data-2025-03");
        assert_eq!(month.description(), "March 2025");
        assert_eq!(QueryScope::Year(2024).file_stem(), "weather-data-2024");
        assert_eq!(QueryScope::All.description(), "All Data");
    }

    #[test]
    fn test_data_source_serialization() {
        assert_eq!(
            serde_json::to_string(&DataSource::LocalFallback).unwrap(),
            "\"local-fallback\""
        );
        assert!(DataSource::LocalFallback.is_fallback());
        assert!(!DataSource::Remote.is_fallback());
    }

    #[test]
    fn test_data_source_combine() {
        assert_eq!(DataSource::Remote.combine(DataSource::Remote), DataSource::Remote);
        assert_eq!(
            DataSource::Remote.combine(DataSource::LocalFallback),
            DataSource::LocalFallback
        );
        assert_eq!(DataSource::Local.combine(DataSource::Local), DataSource::Local);
    }

    #[test]
    fn test_export_format_from_query() {
        assert_eq!(ExportFormat::from_query(Some("csv")), ExportFormat::Csv);
        assert_eq!(ExportFormat::from_query(Some("CSV")), ExportFormat::Csv);
        assert_eq!(ExportFormat::from_query(Some("xml")), ExportFormat::Json);
        assert_eq!(ExportFormat::from_query(None), ExportFormat::Json);
    }

    #[test]
    fn test_month_name_bounds() {
        assert_eq!(month_name(1), Some("January"));
        assert_eq!(month_name(12), Some("December"));
        assert_eq!(month_name(0), None);
        assert_eq!(month_name(13), None);
    }
}
