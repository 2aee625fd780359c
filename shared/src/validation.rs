//! Validation utilities for weather station readings
//!
//! Every check here runs before a record reaches storage.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{NewWeatherRecord, WeatherRecord, WeatherRecordPatch};

/// Rejected input, with the offending field when there is a single one
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub field: Option<String>,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    /// Error not tied to one field
    pub fn general(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
        }
    }
}

// ============================================================================
// Single Reading Validations
// ============================================================================

/// Validate humidity is a percentage (0-100 inclusive)
pub fn validate_humidity(humidity: Decimal) -> Result<(), ValidationError> {
    if humidity < Decimal::ZERO || humidity > Decimal::ONE_HUNDRED {
        return Err(ValidationError::new(
            "humidity",
            "Humidity must be between 0 and 100",
        ));
    }
    Ok(())
}

/// Validate rainfall is not negative
pub fn validate_rainfall(rainfall: Decimal) -> Result<(), ValidationError> {
    if rainfall < Decimal::ZERO {
        return Err(ValidationError::new("rainfall", "Rainfall cannot be negative"));
    }
    Ok(())
}

/// Validate the day's minimum does not exceed its maximum
pub fn validate_temperature_order(min: Decimal, max: Decimal) -> Result<(), ValidationError> {
    if min > max {
        return Err(ValidationError::new(
            "minTemperature",
            "Minimum temperature cannot be higher than maximum temperature",
        ));
    }
    Ok(())
}

// ============================================================================
// Record Validations
// ============================================================================

pub fn validate_new_record(record: &NewWeatherRecord) -> Result<(), ValidationError> {
    validate_rainfall(record.rainfall)?;
    validate_humidity(record.humidity)?;
    validate_temperature_order(record.min_temperature, record.max_temperature)
}

/// Validate a stored record, e.g. after a patch has been merged into it
pub fn validate_record(record: &WeatherRecord) -> Result<(), ValidationError> {
    validate_rainfall(record.rainfall)?;
    validate_humidity(record.humidity)?;
    validate_temperature_order(record.min_temperature, record.max_temperature)
}

/// Validate the fields a patch carries.
///
/// Temperature order can only be checked here when both ends are present;
/// the merged record must be checked again by whoever performs the merge.
pub fn validate_patch(patch: &WeatherRecordPatch) -> Result<(), ValidationError> {
    if patch.is_empty() {
        return Err(ValidationError::general("No fields to update"));
    }
    if let Some(rainfall) = patch.rainfall {
        validate_rainfall(rainfall)?;
    }
    if let Some(humidity) = patch.humidity {
        validate_humidity(humidity)?;
    }
    if let (Some(min), Some(max)) = (patch.min_temperature, patch.max_temperature) {
        validate_temperature_order(min, max)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(min: i64, max: i64, humidity: i64, rainfall: i64) -> NewWeatherRecord {
        NewWeatherRecord {
            date: NaiveDate::from_ymd_opt(2025, 1, 20).unwrap(),
            rainfall: Decimal::from(rainfall),
            max_temperature: Decimal::from(max),
            min_temperature: Decimal::from(min),
            humidity: Decimal::from(humidity),
        }
    }

    #[test]
    fn test_validate_new_record_valid() {
        assert!(validate_new_record(&record(24, 32, 78, 12)).is_ok());
        // Equal min and max is allowed
        assert!(validate_new_record(&record(25, 25, 0, 0)).is_ok());
        assert!(validate_new_record(&record(-5, 3, 100, 0)).is_ok());
    }

    #[test]
    fn test_min_above_max_rejected() {
        let err = validate_new_record(&record(30, 20, 50, 0)).unwrap_err();
        assert_eq!(err.field.as_deref(), Some("minTemperature"));
        assert_eq!(
            err.message,
            "Minimum temperature cannot be higher than maximum temperature"
        );
    }

    #[test]
    fn test_humidity_bounds() {
        assert!(validate_humidity(Decimal::ZERO).is_ok());
        assert!(validate_humidity(Decimal::ONE_HUNDRED).is_ok());
        assert!(validate_humidity(Decimal::new(-1, 1)).is_err());
        assert!(validate_humidity(Decimal::new(1001, 1)).is_err());
    }

    #[test]
    fn test_negative_rainfall_rejected() {
        let err = validate_new_record(&record(20, 30, 50, -1)).unwrap_err();
        assert_eq!(err.field.as_deref(), Some("rainfall"));
    }

    #[test]
    fn test_validate_patch() {
        assert!(validate_patch(&WeatherRecordPatch::default()).is_err());

        let partial = WeatherRecordPatch {
            min_temperature: Some(Decimal::from(40)),
            ..Default::default()
        };
        // Cannot be judged without the stored maximum
        assert!(validate_patch(&partial).is_ok());

        let inverted = WeatherRecordPatch {
            min_temperature: Some(Decimal::from(40)),
            max_temperature: Some(Decimal::from(30)),
            ..Default::default()
        };
        assert!(validate_patch(&inverted).is_err());

        let humid = WeatherRecordPatch {
            humidity: Some(Decimal::from(120)),
            ..Default::default()
        };
        assert!(validate_patch(&humid).is_err());
    }

    #[test]
    fn test_validate_record_after_merge() {
        let mut stored = crate::models::default_records().remove(0);
        assert!(validate_record(&stored).is_ok());
        stored.min_temperature = stored.max_temperature + Decimal::ONE;
        assert!(validate_record(&stored).is_err());
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    /// Temperatures in tenths of a degree, -20.0 to 50.0°C
    fn temperature_strategy() -> impl Strategy<Value = Decimal> {
        (-200i64..=500i64).prop_map(|n| Decimal::new(n, 1))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_temperature_order_matches_comparison(
            a in temperature_strategy(),
            b in temperature_strategy()
        ) {
            prop_assert_eq!(validate_temperature_order(a, b).is_ok(), a <= b);
        }

        #[test]
        fn prop_humidity_accepts_only_percentages(tenths in -500i64..=1500i64) {
            let humidity = Decimal::new(tenths, 1);
            let in_range = humidity >= Decimal::ZERO && humidity <= Decimal::ONE_HUNDRED;
            prop_assert_eq!(validate_humidity(humidity).is_ok(), in_range);
        }
    }
}
