use axum::{
    extract::Request,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::env;
use tracing::{error, warn};

use crate::api::common::ErrorBody;

/// JWT claims matching the token payload issued by the auth service.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JwtClaims {
    pub sub: String, // user_id as string
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

/// Current user data extracted from the JWT.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: i64,
    pub email: String,
}

pub const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

fn get_jwt_secret() -> String {
    env::var("JWT_SECRET")
        .unwrap_or_else(|_| "grapadi_jwt_secret_dev_only_change_in_production".to_string())
}

fn unauthorized(error: &str, message: &str) -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorBody {
            success: false,
            error: format!("{error}: {message}"),
        }),
    )
}

/// Extract and validate the bearer token, attaching a `CurrentUser`
/// extension for downstream handlers.
pub async fn extract_current_user(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<ErrorBody>)> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or_else(|| {
            warn!("Missing Authorization header");
            unauthorized(
                "Missing Authorization header",
                "Authentication required. Please provide a valid Bearer token.",
            )
        })?;

    if !auth_header.starts_with("Bearer ") {
        warn!("Invalid Authorization header format");
        return Err(unauthorized(
            "Invalid Authorization header format",
            "Authorization header must start with 'Bearer '.",
        ));
    }

    let token = auth_header.trim_start_matches("Bearer ").trim();
    if token.is_empty() {
        warn!("Empty JWT token");
        return Err(unauthorized(
            "Empty JWT token",
            "Please provide a valid JWT token.",
        ));
    }

    let jwt_secret = get_jwt_secret();
    let decoding_key = DecodingKey::from_secret(jwt_secret.as_bytes());
    let validation = Validation::new(JWT_ALGORITHM);

    let token_data = decode::<JwtClaims>(token, &decoding_key, &validation).map_err(|e| {
        error!("JWT validation failed: {}", e);
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => unauthorized(
                "Token expired",
                "Your session has expired. Please log in again.",
            ),
            _ => unauthorized(
                "Invalid token",
                "Could not validate credentials. Please log in again.",
            ),
        }
    })?;

    let claims = token_data.claims;

    let user_id = claims.sub.parse::<i64>().map_err(|_| {
        error!("Invalid user_id in JWT sub field: {}", claims.sub);
        unauthorized(
            "Invalid token",
            "Could not validate credentials. Please log in again.",
        )
    })?;

    let current_user = CurrentUser {
        user_id,
        email: claims.email,
    };

    request.extensions_mut().insert(current_user);

    Ok(next.run(request).await)
}
