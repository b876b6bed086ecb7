use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
};
use tracing::warn;
use uuid::Uuid;

use crate::auth::token::AuthToken;
use crate::error::ApiError;
use crate::state::AppState;

/// Resolves the bearer token from the Authorization header to the id of an
/// active user. Rejection is 401 in every failure mode.
pub struct AuthUser(pub Uuid);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| {
                ApiError::Unauthorized("Authentication credentials were not provided".into())
            })?;

        let key = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or_else(|| ApiError::Unauthorized("Invalid authorization scheme".into()))?;

        match AuthToken::resolve_user(&state.db, key).await? {
            Some(user_id) => Ok(AuthUser(user_id)),
            None => {
                warn!("unknown or inactive bearer token");
                Err(ApiError::Unauthorized("Invalid token".into()))
            }
        }
    }
}
