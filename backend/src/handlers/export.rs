//! Download handler for the history export

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Deserialize;
use shared::{ExportFormat, QueryScope};

use super::DATA_SOURCE_HEADER;
use crate::error::AppResult;
use crate::services::ExportService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub format: Option<String>, // "json" or "csv"
}

/// Download the records for a year, a month or everything
pub async fn download_weather_data(
    State(state): State<AppState>,
    Query(query): Query<DownloadQuery>,
) -> AppResult<Response> {
    let scope = QueryScope::from_parts(query.year, query.month);
    let format = ExportFormat::from_query(query.format.as_deref());

    let served = state.store.query(scope).await?;
    let file = ExportService::render(scope, format, served.data, Utc::now())?;
    tracing::info!("Exporting {} as {}", scope.description(), file.file_name);

    let disposition = format!("attachment; filename=\"{}\"", file.file_name);
    Ok((
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
            (DATA_SOURCE_HEADER, served.source.as_str().to_string()),
        ],
        file.body,
    )
        .into_response())
}
