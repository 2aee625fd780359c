//! HTTP handlers

pub mod auth;
pub mod export;
pub mod health;
pub mod weather;

use axum::{
    http::HeaderName,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::DataSource;

pub use auth::login;
pub use export::download_weather_data;
pub use health::{health_check, ping};
pub use weather::{
    add_weather_data, available_dates, create_backup, delete_weather_data, get_weather_record,
    today_weather, update_weather_data, weather_history,
};

pub const DATA_SOURCE_HEADER: HeaderName = HeaderName::from_static("x-data-source");

/// JSON body tagged with the backend that produced it
pub(crate) fn served_json<T: Serialize>(source: DataSource, body: T) -> Response {
    ([(DATA_SOURCE_HEADER, source.as_str())], Json(body)).into_response()
}
