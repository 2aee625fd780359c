//! Authentication handlers

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::error::AppError;
use crate::services::auth::{AuthService, AuthToken};
use crate::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

/// Login endpoint handler
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthToken>, AppError> {
    let auth_service = AuthService::new(&state.config.auth);
    let token = auth_service.login(&body.password)?;
    Ok(Json(token))
}
