use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        credentials::{
            hash_password, is_valid_email, normalize_email, verify_password, MIN_PASSWORD_LEN,
        },
        dto::{CreateUserRequest, TokenRequest, TokenResponse, UserOut},
        extractors::AuthUser,
        repo::User,
        token::AuthToken,
    },
    error::ApiError,
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user))
        .route("/users/token", post(issue_token))
        .route("/users/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserOut>), ApiError> {
    let email = normalize_email(&payload.email);

    if !is_valid_email(&email) {
        warn!("rejected registration with invalid email");
        return Err(ApiError::validation("email", "enter a valid email address"));
    }

    if payload.password.chars().count() < MIN_PASSWORD_LEN {
        warn!("rejected registration with short password");
        return Err(ApiError::validation(
            "password",
            format!("ensure this field has at least {MIN_PASSWORD_LEN} characters"),
        ));
    }

    if User::find_by_email(&state.db, &email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(ApiError::validation(
            "email",
            "a user with this email already exists",
        ));
    }

    let hash = hash_password(&payload.password)?;
    let user = User::create(&state.db, &email, &hash, payload.name.trim()).await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip(state, payload))]
pub async fn issue_token(
    State(state): State<AppState>,
    Json(payload): Json<TokenRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let email = normalize_email(&payload.email);
    if email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::BadCredentials);
    }

    // Unknown email and wrong password take the same exit.
    let user = match User::find_by_email(&state.db, &email).await? {
        Some(u) if u.is_active => u,
        _ => {
            warn!("token requested for unknown or inactive account");
            return Err(ApiError::BadCredentials);
        }
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "token requested with wrong password");
        return Err(ApiError::BadCredentials);
    }

    let token = AuthToken::get_or_create(&state.db, user.id).await?;
    info!(user_id = %user.id, "token issued");
    Ok(Json(TokenResponse { token: token.key }))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<UserOut>, ApiError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User not found".into()))?;
    Ok(Json(user.into()))
}
