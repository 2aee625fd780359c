//! WebAssembly module for the Kariyad weather station dashboard
//!
//! Provides client-side helpers for:
//! - Manual entry validation before submission
//! - Day-over-day change labels
//! - History filter captions and download file names

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Validation failure as handed to the entry form
#[derive(Debug, Serialize)]
struct FormError<'a> {
    field: Option<&'a str>,
    message: &'a str,
}

/// Validate a manual entry form.
///
/// Returns the normalised record as JSON, or throws a JSON `{field, message}`.
#[wasm_bindgen]
pub fn validate_weather_entry(form_json: &str) -> Result<String, JsValue> {
    match check_entry(form_json) {
        Ok(json) => Ok(json),
        Err(e) => {
            web_sys::console::warn_1(&JsValue::from_str(&e.message));
            let body = serde_json::to_string(&FormError {
                field: e.field.as_deref(),
                message: &e.message,
            })
            .unwrap_or_else(|_| e.message.clone());
            Err(JsValue::from_str(&body))
        }
    }
}

/// Change label for one metric, e.g. `+1.5°C` or `No change`
#[wasm_bindgen]
pub fn format_change_text(current: f64, previous: Option<f64>, unit: &str) -> String {
    comparison(current, previous)
        .map(|c| c.change_text(unit))
        .unwrap_or_else(|| "No change".to_string())
}

/// `increase`, `decrease` or `neutral`
#[wasm_bindgen]
pub fn change_direction(current: f64, previous: Option<f64>) -> String {
    let change_type = comparison(current, previous)
        .map(|c| c.change_type)
        .unwrap_or(ChangeType::Neutral);
    match change_type {
        ChangeType::Increase => "increase",
        ChangeType::Decrease => "decrease",
        ChangeType::Neutral => "neutral",
    }
    .to_string()
}

/// Dashboard comparison of two stored records given as JSON
#[wasm_bindgen]
pub fn compare_records(current_json: &str, previous_json: Option<String>) -> Result<String, JsValue> {
    compare_record_json(current_json, previous_json.as_deref()).map_err(|e| JsValue::from_str(&e))
}

/// Caption above the history table, e.g. `March 2025`
#[wasm_bindgen]
pub fn filter_description(year: Option<i32>, month: Option<u32>) -> String {
    QueryScope::from_parts(year, month).description()
}

/// File name the download endpoint will use
#[wasm_bindgen]
pub fn download_file_name(year: Option<i32>, month: Option<u32>, format: &str) -> String {
    let scope = QueryScope::from_parts(year, month);
    let format = ExportFormat::from_query(Some(format));
    format!("{}.{}", scope.file_stem(), format.extension())
}

#[wasm_bindgen]
pub fn month_label(month: u32) -> Option<String> {
    month_name(month).map(str::to_string)
}

/// Browser-local date as `YYYY-MM-DD`, the entry form's default
#[wasm_bindgen]
pub fn today_iso() -> String {
    let now = js_sys::Date::new_0();
    format!(
        "{:04}-{:02}-{:02}",
        now.get_full_year(),
        now.get_month() + 1,
        now.get_date()
    )
}

fn check_entry(form_json: &str) -> Result<String, ValidationError> {
    let form: WeatherEntryForm = serde_json::from_str(form_json)
        .map_err(|e| ValidationError::general(format!("Invalid form data: {}", e)))?;
    let record = form.into_new_record()?;
    serde_json::to_string(&record)
        .map_err(|e| ValidationError::general(format!("Invalid form data: {}", e)))
}

fn comparison(current: f64, previous: Option<f64>) -> Option<WeatherComparison> {
    let current = to_decimal(current)?;
    let previous = match previous {
        Some(value) => Some(to_decimal(value)?),
        None => None,
    };
    Some(WeatherComparison::new(current, previous))
}

fn compare_record_json(current_json: &str, previous_json: Option<&str>) -> Result<String, String> {
    let current: WeatherRecord =
        serde_json::from_str(current_json).map_err(|e| format!("Invalid record JSON: {}", e))?;
    let previous: Option<WeatherRecord> = previous_json
        .map(serde_json::from_str::<WeatherRecord>)
        .transpose()
        .map_err(|e| format!("Invalid record JSON: {}", e))?;

    let display = DailyWeatherDisplay::between(&current, previous.as_ref());
    serde_json::to_string(&display).map_err(|e| format!("Serialization failed: {}", e))
}

/// Shortest decimal form of `value`; JS numbers like 30.1 stay 30.1
fn to_decimal(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_str(&value.to_string()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_entry() {
        let ok = check_entry(
            r#"{"date":"2025-01-20","rainfall":"2.5","maxTemperature":31,"minTemperature":23.5,"humidity":70}"#,
        )
        .unwrap();
        let record: NewWeatherRecord = serde_json::from_str(&ok).unwrap();
        assert_eq!(record.min_temperature, Decimal::new(235, 1));

        let missing = check_entry(r#"{"date":"2025-01-20"}"#).unwrap_err();
        assert_eq!(missing.message, "All fields are required");

        let inverted = check_entry(
            r#"{"date":"2025-01-20","rainfall":0,"maxTemperature":20,"minTemperature":25,"humidity":70}"#,
        )
        .unwrap_err();
        assert_eq!(inverted.field.as_deref(), Some("minTemperature"));
    }

    #[test]
    fn test_change_text() {
        assert_eq!(format_change_text(32.1, Some(31.5), "°C"), "+0.6°C");
        assert_eq!(format_change_text(8.2, Some(12.5), "mm"), "-4.3mm");
        assert_eq!(format_change_text(75.0, None, "%"), "No change");
        assert_eq!(format_change_text(75.0, Some(75.0), "%"), "No change");
    }

    #[test]
    fn test_change_direction() {
        assert_eq!(change_direction(30.05, Some(30.0)), "neutral");
        assert_eq!(change_direction(30.1, Some(30.0)), "increase");
        assert_eq!(change_direction(5.0, Some(0.0)), "increase");
        assert_eq!(change_direction(f64::NAN, Some(1.0)), "neutral");
    }

    #[test]
    fn test_compare_records() {
        let records = default_records();
        let current = serde_json::to_string(&records[0]).unwrap();
        let previous = serde_json::to_string(&records[1]).unwrap();

        let json = compare_record_json(&current, Some(&previous)).unwrap();
        let display: DailyWeatherDisplay = serde_json::from_str(&json).unwrap();
        assert_eq!(display.rainfall.change_type, ChangeType::Increase);

        assert!(compare_record_json("{}", None).is_err());
    }

    #[test]
    fn test_filter_helpers() {
        assert_eq!(filter_description(Some(2025), Some(3)), "March 2025");
        assert_eq!(filter_description(None, Some(3)), "All Data");
        assert_eq!(download_file_name(Some(2025), Some(3), "csv"), "weather-data-2025-03.csv");
        assert_eq!(download_file_name(Some(2024), None, "json"), "weather-data-2024.json");
        assert_eq!(download_file_name(None, None, "xml"), "weather-data-all.json");
        assert_eq!(month_label(2).as_deref(), Some("February"));
        assert_eq!(month_label(13), None);
    }
}
