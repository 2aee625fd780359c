//! HTTP handlers for weather record endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use shared::{
    QueryScope, RecordId, SaveWeatherResponse, WeatherEntryForm, WeatherHistoryResponse,
    WeatherRecordPatch,
};

use super::served_json;
use crate::error::{AppError, AppResult};
use crate::middleware::CurrentAdmin;
use crate::services::today_summary;
use crate::AppState;

/// Query parameters for the history table
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct BackupResponse {
    pub success: bool,
    pub path: String,
}

/// Today's readings compared with yesterday
pub async fn today_weather(State(state): State<AppState>) -> AppResult<Response> {
    let summary = today_summary(&state.store, Utc::now().date_naive()).await?;
    Ok(served_json(summary.source, summary))
}

/// Records for a year, a month or everything, most recent first
pub async fn weather_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Response> {
    let scope = QueryScope::from_parts(query.year, query.month);
    let served = state.store.query(scope).await?;
    tracing::debug!("History for {}: {} records", scope.description(), served.data.len());

    let source = served.source;
    Ok(served_json(
        source,
        WeatherHistoryResponse::single_page(served.data, source),
    ))
}

pub async fn available_dates(State(state): State<AppState>) -> Response {
    let served = state.store.get_available_dates().await;
    served_json(served.source, served.data)
}

pub async fn get_weather_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let served = state.store.get_by_id(&RecordId::new(id)).await;
    let record = served
        .data
        .ok_or_else(|| AppError::NotFound("Weather record".to_string()))?;
    Ok(served_json(served.source, record))
}

/// Manual entry: overwrites the reading for the form's date or creates one
pub async fn add_weather_data(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
    payload: Result<Json<WeatherEntryForm>, JsonRejection>,
) -> AppResult<Response> {
    let Json(form) = payload.map_err(|e| AppError::Validation {
        field: None,
        message: e.body_text(),
    })?;
    let input = form.into_new_record()?;

    let served = state.store.upsert_by_date(input).await?;
    let upserted = served.data;
    tracing::info!(
        admin = %admin.subject,
        session_expires_at = admin.expires_at,
        date = %upserted.record.date,
        created = upserted.created,
        "Weather data saved"
    );

    let (status, message) = if upserted.created {
        (StatusCode::CREATED, "Weather data saved successfully")
    } else {
        (StatusCode::OK, "Weather data updated successfully")
    };

    let body = SaveWeatherResponse {
        success: true,
        message: message.to_string(),
        id: upserted.record.id,
        created: upserted.created,
    };
    Ok((status, served_json(served.source, body)).into_response())
}

pub async fn update_weather_data(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
    Path(id): Path<String>,
    payload: Result<Json<WeatherRecordPatch>, JsonRejection>,
) -> AppResult<Response> {
    let Json(patch) = payload.map_err(|e| AppError::Validation {
        field: None,
        message: e.body_text(),
    })?;
    let id = RecordId::new(id);

    let served = state.store.update(&id, patch).await?;
    let record = served
        .data
        .ok_or_else(|| AppError::NotFound("Weather record".to_string()))?;
    tracing::info!(admin = %admin.subject, id = %record.id, "Weather record updated");

    Ok(served_json(served.source, record))
}

pub async fn delete_weather_data(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let id = RecordId::new(id);
    let served = state.store.delete(&id).await?;
    if !served.data {
        return Err(AppError::NotFound("Weather record".to_string()));
    }
    tracing::info!(admin = %admin.subject, id = %id, "Weather record deleted");

    Ok(served_json(
        served.source,
        DeleteResponse {
            success: true,
            message: "Weather data deleted successfully".to_string(),
        },
    ))
}

/// Snapshot the local data file
pub async fn create_backup(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
) -> AppResult<Json<BackupResponse>> {
    let path = state.store.create_backup().await?;
    tracing::info!(admin = %admin.subject, "Backup requested");

    Ok(Json(BackupResponse {
        success: true,
        path: path.display().to_string(),
    }))
}
