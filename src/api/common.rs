use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use sqlx::PgPool;
use tracing::error;
use uuid::Uuid;

use crate::domains::points::PointError;
use crate::domains::redemptions::RedemptionError;
use crate::middleware::auth::CurrentUser;

/// Standard API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub request_id: String,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            message: None,
            request_id: Uuid::new_v4().to_string(),
        })
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
            request_id: Uuid::new_v4().to_string(),
        })
    }
}

/// Error payload; also used by the auth middleware.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

/// API error wrapper for HTTP responses
#[derive(Debug)]
pub enum ApiError {
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    BadRequest(String),
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorBody {
            success: false,
            error: message,
        });

        (status, body).into_response()
    }
}

impl From<RedemptionError> for ApiError {
    fn from(err: RedemptionError) -> Self {
        match &err {
            RedemptionError::ItemNotFound | RedemptionError::RequestNotFound => {
                ApiError::NotFound(err.to_string())
            }
            RedemptionError::Database(msg) => {
                error!("Redemption database error: {}", msg);
                ApiError::InternalError(
                    "Terjadi kesalahan pada server. Silakan coba lagi.".to_string(),
                )
            }
            _ => ApiError::BadRequest(err.to_string()),
        }
    }
}

impl From<PointError> for ApiError {
    fn from(err: PointError) -> Self {
        match &err {
            PointError::UserNotFound => ApiError::NotFound(err.to_string()),
            PointError::Database(msg) => {
                error!("Point ledger database error: {}", msg);
                ApiError::InternalError(
                    "Terjadi kesalahan pada server. Silakan coba lagi.".to_string(),
                )
            }
            _ => ApiError::BadRequest(err.to_string()),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        error!("Database error: {}", err);
        ApiError::InternalError("Terjadi kesalahan pada server. Silakan coba lagi.".to_string())
    }
}

/// Admin gate used by the /admin handlers.
pub async fn require_admin(db: &PgPool, user: &CurrentUser) -> Result<(), ApiError> {
    let role: Option<String> = sqlx::query_scalar("SELECT role FROM users WHERE id = $1")
        .bind(user.user_id)
        .fetch_optional(db)
        .await?;

    if role.as_deref() == Some("admin") {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Akses khusus admin".to_string()))
    }
}
