//! Route definitions for the Kariyad weather station API

use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Router,
};

use crate::{handlers, middleware::require_admin, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .route("/health", get(handlers::health_check))
        // Auth routes (public)
        .route("/auth/login", post(handlers::login))
        .nest("/weather", weather_routes(state))
}

/// Weather routes; reads are public, writes need an admin token
fn weather_routes(state: AppState) -> Router<AppState> {
    let admin = middleware::from_fn_with_state(state, require_admin);

    Router::new()
        .route("/today", get(handlers::today_weather))
        .route("/history", get(handlers::weather_history))
        .route("/available-dates", get(handlers::available_dates))
        .route("/download", get(handlers::download_weather_data))
        .route(
            "/add",
            post(handlers::add_weather_data).route_layer(admin.clone()),
        )
        .route(
            "/backup",
            post(handlers::create_backup).route_layer(admin.clone()),
        )
        .route(
            "/delete/:id",
            delete(handlers::delete_weather_data).route_layer(admin.clone()),
        )
        .route(
            "/:id",
            get(handlers::get_weather_record)
                .merge(patch(handlers::update_weather_data).route_layer(admin)),
        )
}
