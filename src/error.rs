use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Rejected input, reported under the offending field.
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// Token endpoint failure. One message for unknown email and wrong
    /// password, so callers cannot probe which emails are registered.
    #[error("unable to authenticate with provided credentials")]
    BadCredentials,

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(&'static str),

    #[error(transparent)]
    Database(sqlx::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        ApiError::Validation {
            field,
            message: message.into(),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db) = err {
            if db.is_unique_violation() && db.constraint() == Some("users_email_key") {
                return ApiError::validation("email", "a user with this email already exists");
            }
        }
        ApiError::Database(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                Json(json!({ field: [message] })),
            )
                .into_response(),
            ApiError::BadCredentials => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "non_field_errors": ["Unable to authenticate with provided credentials"]
                })),
            )
                .into_response(),
            ApiError::Unauthorized(detail) => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "detail": detail })),
            )
                .into_response(),
            ApiError::NotFound(detail) => {
                (StatusCode::NOT_FOUND, Json(json!({ "detail": detail }))).into_response()
            }
            ApiError::Database(e) => {
                error!(error = %e, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "detail": "internal server error" })),
                )
                    .into_response()
            }
            ApiError::Internal(e) => {
                error!(error = %e, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "detail": "internal server error" })),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_400_with_field_body() {
        let resp = ApiError::validation("name", "this field may not be blank").into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn bad_credentials_maps_to_400() {
        let resp = ApiError::BadCredentials.into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn unauthorized_maps_to_401() {
        let resp = ApiError::Unauthorized("invalid token".into()).into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn not_found_maps_to_404() {
        let resp = ApiError::NotFound("not found").into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn row_not_found_maps_to_500_not_404() {
        // RowNotFound is a programming error here; misses are modelled with
        // fetch_optional and ApiError::NotFound at the handler level.
        let resp = ApiError::from(sqlx::Error::RowNotFound).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
