use axum::Router;

use crate::state::AppState;

mod credentials;
mod dto;
pub mod extractors;
pub mod handlers;
pub mod repo;
pub mod token;

pub fn router() -> Router<AppState> {
    handlers::user_routes()
}
