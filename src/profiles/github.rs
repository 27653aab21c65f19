use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;
use tracing::{instrument, warn};

use crate::error::ApiError;
use crate::state::AppState;

/// Proxy of the public GitHub repo listing for a username: five newest
/// repositories, passed through as-is.
#[instrument(skip(state))]
pub async fn repos(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let url = format!("https://api.github.com/users/{username}/repos?sort=created&per_page=5");
    let resp = state
        .http
        .get(&url)
        .header(reqwest::header::USER_AGENT, "devconnect")
        .send()
        .await
        .map_err(|e| ApiError::Internal(e.into()))?;

    if !resp.status().is_success() {
        warn!(%username, status = %resp.status(), "github lookup failed");
        return Err(ApiError::not_found("No GitHub profile found."));
    }

    let body = resp
        .json::<Value>()
        .await
        .map_err(|e| ApiError::Internal(e.into()))?;
    Ok(Json(body))
}
