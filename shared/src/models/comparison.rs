//! Day-over-day comparison of readings

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::WeatherRecord;

/// Direction of change between two readings
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Increase,
    Decrease,
    Neutral,
}

/// Changes smaller than this are reported as neutral
pub fn neutral_threshold() -> Decimal {
    Decimal::new(1, 1)
}

/// One metric compared against the previous day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeatherComparison {
    #[serde(with = "rust_decimal::serde::float")]
    pub current: Decimal,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub previous: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub change: Option<Decimal>,
    pub change_type: ChangeType,
}

impl WeatherComparison {
    pub fn new(current: Decimal, previous: Option<Decimal>) -> Self {
        let Some(previous) = previous else {
            return Self {
                current,
                previous: None,
                change: None,
                change_type: ChangeType::Neutral,
            };
        };

        let change = current - previous;
        let change_type = if change.abs() < neutral_threshold() {
            ChangeType::Neutral
        } else if change > Decimal::ZERO {
            ChangeType::Increase
        } else {
            ChangeType::Decrease
        };

        Self {
            current,
            previous: Some(previous),
            change: Some(change),
            change_type,
        }
    }

    /// Human readable change, e.g. `+1.5°C` or `No change`
    pub fn change_text(&self, unit: &str) -> String {
        match self.change {
            Some(change) if !change.is_zero() => {
                let sign = if change > Decimal::ZERO { "+" } else { "" };
                format!("{}{:.1}{}", sign, change, unit)
            }
            _ => "No change".to_string(),
        }
    }
}

/// Dashboard view of one day against the day before
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyWeatherDisplay {
    pub date: NaiveDate,
    pub rainfall: WeatherComparison,
    pub max_temperature: WeatherComparison,
    pub min_temperature: WeatherComparison,
    pub humidity: WeatherComparison,
}

impl DailyWeatherDisplay {
    pub fn between(current: &WeatherRecord, previous: Option<&WeatherRecord>) -> Self {
        Self {
            date: current.date,
            rainfall: WeatherComparison::new(current.rainfall, previous.map(|p| p.rainfall)),
            max_temperature: WeatherComparison::new(
                current.max_temperature,
                previous.map(|p| p.max_temperature),
            ),
            min_temperature: WeatherComparison::new(
                current.min_temperature,
                previous.map(|p| p.min_temperature),
            ),
            humidity: WeatherComparison::new(current.humidity, previous.map(|p| p.humidity)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::default_records;

    #[test]
    fn test_no_previous_is_neutral() {
        let cmp = WeatherComparison::new(Decimal::from(30), None);
        assert_eq!(cmp.change_type, ChangeType::Neutral);
        assert!(cmp.change.is_none());
        assert!(cmp.previous.is_none());
    }

    #[test]
    fn test_small_change_is_neutral() {
        let cmp = WeatherComparison::new(Decimal::new(3005, 2), Some(Decimal::from(30)));
        assert_eq!(cmp.change_type, ChangeType::Neutral);
        assert_eq!(cmp.change, Some(Decimal::new(5, 2)));
    }

    #[test]
    fn test_threshold_boundary_counts_as_change() {
        let cmp = WeatherComparison::new(Decimal::new(301, 1), Some(Decimal::from(30)));
        assert_eq!(cmp.change_type, ChangeType::Increase);

        let cmp = WeatherComparison::new(Decimal::new(299, 1), Some(Decimal::from(30)));
        assert_eq!(cmp.change_type, ChangeType::Decrease);
    }

    #[test]
    fn test_zero_previous_is_a_reading() {
        let cmp = WeatherComparison::new(Decimal::from(5), Some(Decimal::ZERO));
        assert_eq!(cmp.previous, Some(Decimal::ZERO));
        assert_eq!(cmp.change_type, ChangeType::Increase);
    }

    #[test]
    fn test_change_text() {
        let up = WeatherComparison::new(Decimal::new(321, 1), Some(Decimal::new(315, 1)));
        assert_eq!(up.change_text("°C"), "+0.6°C");

        let down = WeatherComparison::new(Decimal::new(82, 1), Some(Decimal::new(125, 1)));
        assert_eq!(down.change_text("mm"), "-4.3mm");

        let humid = WeatherComparison::new(Decimal::from(78), Some(Decimal::from(75)));
        assert_eq!(humid.change_text("%"), "+3.0%");

        let flat = WeatherComparison::new(Decimal::from(78), Some(Decimal::from(78)));
        assert_eq!(flat.change_text("%"), "No change");
    }

    #[test]
    fn test_daily_display_between_seed_days() {
        let records = default_records();
        let display = DailyWeatherDisplay::between(&records[0], Some(&records[1]));

        assert_eq!(display.date, records[0].date);
        assert_eq!(display.rainfall.change_type, ChangeType::Increase);
        assert_eq!(display.min_temperature.change_type, ChangeType::Decrease);
        assert_eq!(display.humidity.change, Some(Decimal::from(3)));
    }

    #[test]
    fn test_comparison_serializes_nulls() {
        let json = serde_json::to_value(WeatherComparison::new(Decimal::from(1), None)).unwrap();
        assert!(json["previous"].is_null());
        assert!(json["change"].is_null());
        assert_eq!(json["changeType"], "neutral");
    }
}
