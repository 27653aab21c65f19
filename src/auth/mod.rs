use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

mod dto;
pub mod handlers;
pub mod password;
pub mod tokens;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", post(handlers::register))
        .route(
            "/auth",
            get(handlers::current_user).post(handlers::login),
        )
}
