use axum::Router;

use crate::state::AppState;

mod dto;
pub mod handlers;
pub mod repo;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::attr_routes())
        .merge(handlers::recipe_routes())
}
