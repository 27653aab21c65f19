use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::state::AppState;

mod dto;
pub mod handlers;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/posts", get(handlers::list).post(handlers::create))
        .route(
            "/posts/:id",
            get(handlers::get_by_id)
                .put(handlers::update_text)
                .delete(handlers::delete_post),
        )
        .route("/posts/like/:id", put(handlers::like))
        .route("/posts/unlike/:id", put(handlers::unlike))
        .route("/posts/comment/:id", post(handlers::add_comment))
        .route(
            "/posts/:id/comment/:comment_id",
            put(handlers::update_comment),
        )
        .route(
            "/posts/comment/:id/:comment_id",
            delete(handlers::remove_comment),
        )
}
