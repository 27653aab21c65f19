use axum::{
    routing::{delete, get, put},
    Router,
};

use crate::state::AppState;

mod dto;
mod github;
pub mod handlers;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/profile",
            get(handlers::list)
                .post(handlers::upsert)
                .delete(handlers::delete_account),
        )
        .route("/profile/me", get(handlers::me))
        .route("/profile/user/:user_id", get(handlers::by_user))
        .route("/profile/github/:username", get(github::repos))
        .route("/profile/experience", put(handlers::add_experience))
        .route(
            "/profile/experience/:exp_id",
            delete(handlers::remove_experience),
        )
        .route(
            "/profile/:profile_id/experience/:exp_id",
            put(handlers::update_experience),
        )
        .route("/profile/education", put(handlers::add_education))
        .route(
            "/profile/education/:edu_id",
            delete(handlers::remove_education),
        )
        .route(
            "/profile/:profile_id/education/:edu_id",
            put(handlers::update_education),
        )
}
