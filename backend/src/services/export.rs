//! Export service for downloading the station's history

use chrono::{DateTime, SecondsFormat, Utc};
use shared::{ExportDocument, ExportFormat, QueryScope, WeatherRecord};

use crate::error::{AppError, AppResult};

pub const CSV_HEADER: [&str; 7] = [
    "Date",
    "Rainfall (mm)",
    "Max Temperature (°C)",
    "Min Temperature (°C)",
    "Humidity (%)",
    "Created At",
    "Updated At",
];

/// A rendered download
#[derive(Debug)]
pub struct ExportFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub body: String,
}

pub struct ExportService;

impl ExportService {
    /// Render `records` for download, oldest first
    pub fn render(
        scope: QueryScope,
        format: ExportFormat,
        mut records: Vec<WeatherRecord>,
        now: DateTime<Utc>,
    ) -> AppResult<ExportFile> {
        records.sort_by(|a, b| a.date.cmp(&b.date));

        let body = match format {
            ExportFormat::Csv => Self::export_to_csv(&records)?,
            ExportFormat::Json => Self::export_to_json(records, now)?,
        };

        Ok(ExportFile {
            file_name: format!("{}.{}", scope.file_stem(), format.extension()),
            content_type: format.content_type(),
            body,
        })
    }

    /// CSV with the fixed spreadsheet header
    pub fn export_to_csv(records: &[WeatherRecord]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        wtr.write_record(CSV_HEADER)
            .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;

        for record in records {
            wtr.write_record([
                record.date.to_string(),
                record.rainfall.to_string(),
                record.max_temperature.to_string(),
                record.min_temperature.to_string(),
                record.humidity.to_string(),
                timestamp(record.created_at),
                timestamp(record.updated_at),
            ])
            .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }

        let csv_data = String::from_utf8(
            wtr.into_inner()
                .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?,
        )
        .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))?;
        Ok(csv_data)
    }

    pub fn export_to_json(records: Vec<WeatherRecord>, now: DateTime<Utc>) -> AppResult<String> {
        let document = ExportDocument {
            export_date: now,
            total_records: records.len(),
            data: records,
        };
        serde_json::to_string_pretty(&document)
            .map_err(|e| AppError::Internal(format!("JSON serialization error: {}", e)))
    }
}

fn timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::default_records;

    fn now() -> DateTime<Utc> {
        "2025-02-01T08:00:00Z".parse().unwrap()
    }

    #[test]
    fn test_csv_header_and_rows_ascending() {
        let csv = ExportService::export_to_csv(&{
            let mut records = default_records();
            records.sort_by(|a, b| a.date.cmp(&b.date));
            records
        })
        .unwrap();

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "Date,Rainfall (mm),Max Temperature (°C),Min Temperature (°C),Humidity (%),Created At,Updated At"
        );
        assert_eq!(
            lines[1],
            "2025-01-14,8.2,31.5,25.3,75,2025-01-14T06:00:00.000Z,2025-01-14T06:00:00.000Z"
        );
        assert!(lines[2].starts_with("2025-01-15,12.5,32.1,24.8,78,"));
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_render_month_csv() {
        let file = ExportService::render(
            QueryScope::Month { year: 2025, month: 1 },
            ExportFormat::Csv,
            default_records(),
            now(),
        )
        .unwrap();

        assert_eq!(file.file_name, "weather-data-2025-01.csv");
        assert_eq!(file.content_type, "text/csv");
        // Seed data is stored newest first; the download is oldest first
        assert!(file.body.lines().nth(1).unwrap().starts_with("2025-01-14"));
    }

    #[test]
    fn test_render_all_json() {
        let file =
            ExportService::render(QueryScope::All, ExportFormat::Json, default_records(), now())
                .unwrap();
        assert_eq!(file.file_name, "weather-data-all.json");

        let value: serde_json::Value = serde_json::from_str(&file.body).unwrap();
        assert_eq!(value["totalRecords"], 2);
        assert_eq!(value["exportDate"], "2025-02-01T08:00:00Z");
        assert_eq!(value["data"][0]["date"], "2025-01-14");
    }

    #[test]
    fn test_empty_csv_has_header_only() {
        let csv = ExportService::export_to_csv(&[]).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }
}
