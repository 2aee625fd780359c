//! Authentication middleware
//!
//! Write routes require a bearer token issued by `/api/auth/login`

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::error::{AppError, ErrorDetail, ErrorResponse};
use crate::services::AuthService;
use crate::AppState;

/// Admin identity extracted from a valid token
#[derive(Clone, Debug)]
pub struct AdminSession {
    pub subject: String,
    pub expires_at: i64,
}

/// Validates the bearer token and stores the session in request extensions
pub async fn require_admin(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(TypedHeader(Authorization(bearer))) = bearer else {
        return AppError::Unauthorized("Missing or invalid Authorization header".to_string())
            .into_response();
    };

    let auth_service = AuthService::new(&state.config.auth);
    let claims = match auth_service.validate_token(bearer.token()) {
        Ok(claims) => claims,
        Err(e) => return e.into_response(),
    };

    request.extensions_mut().insert(AdminSession {
        subject: claims.sub,
        expires_at: claims.exp,
    });

    next.run(request).await
}

/// Extractor for the authenticated admin
/// Use this in handlers behind `require_admin`
#[derive(Clone, Debug)]
pub struct CurrentAdmin(pub AdminSession);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for CurrentAdmin
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AdminSession>()
            .cloned()
            .map(CurrentAdmin)
            .ok_or_else(|| {
                let error = ErrorResponse {
                    error: ErrorDetail::new("UNAUTHORIZED", "Authentication required"),
                };
                (StatusCode::UNAUTHORIZED, Json(error))
            })
    }
}
