use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::tokens::AuthUser;
use crate::error::{ApiError, StoreError};
use crate::state::AppState;
use crate::store::models::{Comment, Like, Post};
use crate::store::{PostStore, UserStore};

use super::dto::TextRequest;

fn post_not_found(e: StoreError) -> ApiError {
    match e {
        StoreError::NotFound => ApiError::not_found("Post not found."),
        other => other.into(),
    }
}

#[instrument(skip(state, payload))]
pub async fn create(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<TextRequest>,
) -> Result<Json<Post>, ApiError> {
    let text = payload.require_text()?;
    // snapshot the author's display fields into the post
    let author = state.store.user_by_id(user_id).await.map_err(|e| match e {
        StoreError::NotFound => ApiError::unauthorized("You are not authorized."),
        other => other.into(),
    })?;
    let post = state.store.create_post(&author, &text).await?;
    info!(user_id = %user_id, post_id = %post.id, "post created");
    Ok(Json(post))
}

#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
) -> Result<Json<Vec<Post>>, ApiError> {
    let posts = state.store.list_posts().await?;
    Ok(Json(posts))
}

#[instrument(skip(state))]
pub async fn get_by_id(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Post>, ApiError> {
    let post = state.store.post_by_id(id).await.map_err(post_not_found)?;
    Ok(Json(post))
}

#[instrument(skip(state, payload))]
pub async fn update_text(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<TextRequest>,
) -> Result<Json<Post>, ApiError> {
    let text = payload.require_text()?;
    let post = state
        .store
        .update_post_text(id, &text)
        .await
        .map_err(post_not_found)?;
    Ok(Json(post))
}

#[instrument(skip(state))]
pub async fn delete_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    state
        .store
        .delete_post(id, user_id)
        .await
        .map_err(|e| match e {
            StoreError::NotFound => ApiError::not_found("Post not found."),
            StoreError::Forbidden => ApiError::forbidden("User not authorized."),
            other => other.into(),
        })?;
    info!(user_id = %user_id, post_id = %id, "post deleted");
    Ok(Json(json!({ "msg": "Post removed." })))
}

#[instrument(skip(state))]
pub async fn like(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Like>>, ApiError> {
    let likes = state
        .store
        .like_post(id, user_id)
        .await
        .map_err(|e| match e {
            StoreError::Conflict => ApiError::conflict("Post already liked."),
            StoreError::NotFound => ApiError::not_found("Post not found."),
            other => other.into(),
        })?;
    Ok(Json(likes))
}

#[instrument(skip(state))]
pub async fn unlike(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Like>>, ApiError> {
    let likes = state
        .store
        .unlike_post(id, user_id)
        .await
        .map_err(|e| match e {
            StoreError::Conflict => ApiError::conflict("Post has not yet been liked."),
            StoreError::NotFound => ApiError::not_found("Post not found."),
            other => other.into(),
        })?;
    Ok(Json(likes))
}

#[instrument(skip(state, payload))]
pub async fn add_comment(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<TextRequest>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    let text = payload.require_text()?;
    let author = state.store.user_by_id(user_id).await.map_err(|e| match e {
        StoreError::NotFound => ApiError::unauthorized("You are not authorized."),
        other => other.into(),
    })?;
    let comments = state
        .store
        .add_comment(id, &author, &text)
        .await
        .map_err(post_not_found)?;
    Ok(Json(comments))
}

#[instrument(skip(state, payload))]
pub async fn update_comment(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path((post_id, comment_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<TextRequest>,
) -> Result<Json<Post>, ApiError> {
    let text = payload.require_text()?;
    let post = state
        .store
        .update_comment(post_id, comment_id, &text)
        .await
        .map_err(|e| match e {
            StoreError::NotFound => ApiError::not_found("Comment not found."),
            other => other.into(),
        })?;
    Ok(Json(post))
}

#[instrument(skip(state))]
pub async fn remove_comment(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((post_id, comment_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    let comments = state
        .store
        .remove_comment(post_id, comment_id, user_id)
        .await
        .map_err(|e| match e {
            StoreError::NotFound => ApiError::not_found("Comment not found."),
            StoreError::Forbidden => ApiError::forbidden("User not authorized."),
            other => other.into(),
        })?;
    Ok(Json(comments))
}
