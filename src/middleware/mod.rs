pub mod auth;

pub use auth::{extract_current_user, CurrentUser, JwtClaims};
