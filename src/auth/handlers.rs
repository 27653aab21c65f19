use axum::{
    extract::{FromRef, State},
    Json,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::auth::dto::{LoginRequest, RegisterRequest, TokenResponse};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::tokens::{AuthUser, TokenKeys};
use crate::avatar::gravatar_url;
use crate::error::{ApiError, FieldError, StoreError};
use crate::state::AppState;
use crate::store::models::{NewUser, User};
use crate::store::UserStore;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    let mut errors = Vec::new();
    if payload.name.trim().is_empty() {
        errors.push(FieldError {
            field: "name",
            msg: "Name is required.",
        });
    }
    if !is_valid_email(&payload.email) {
        errors.push(FieldError {
            field: "email",
            msg: "Please include a valid email.",
        });
    }
    if payload.password.len() < 9 {
        errors.push(FieldError {
            field: "password",
            msg: "Please enter a password with 9 or more characters.",
        });
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    if state.store.user_by_email(&payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::conflict("User already exists."));
    }

    let hash = hash_password(&payload.password)?;
    let avatar = gravatar_url(&payload.email);
    let user = state
        .store
        .create_user(NewUser {
            name: payload.name.trim().to_string(),
            email: payload.email,
            password_hash: hash,
            avatar,
        })
        .await
        .map_err(|e| match e {
            // unique-key race between the existence check and the insert
            StoreError::Conflict => ApiError::conflict("User already exists."),
            other => other.into(),
        })?;

    let keys = TokenKeys::from_ref(&state);
    let token = keys.sign(user.id)?;
    info!(user_id = %user.id, "user registered");
    Ok(Json(TokenResponse { token }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    // Same error for unknown email and wrong password: no account probing.
    let user = state
        .store
        .user_by_email(&payload.email)
        .await?
        .ok_or_else(|| {
            warn!(email = %payload.email, "login unknown email");
            ApiError::unauthorized("Invalid credentials.")
        })?;

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::unauthorized("Invalid credentials."));
    }

    let keys = TokenKeys::from_ref(&state);
    let token = keys.sign(user.id)?;
    info!(user_id = %user.id, "user logged in");
    Ok(Json(TokenResponse { token }))
}

#[instrument(skip(state))]
pub async fn current_user(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<User>, ApiError> {
    let user = state.store.user_by_id(user_id).await.map_err(|e| match e {
        // valid token for a deleted account
        StoreError::NotFound => ApiError::unauthorized("You are not authorized."),
        other => other.into(),
    })?;
    Ok(Json(user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_regex_accepts_plain_addresses() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("first.last@sub.example.org"));
    }

    #[test]
    fn email_regex_rejects_malformed() {
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("two@@example.com"));
        assert!(!is_valid_email("spaces in@example.com"));
        assert!(!is_valid_email("user@nodot"));
    }

    #[test]
    fn user_serialization_hides_password_hash() {
        let user = User {
            id: uuid::Uuid::new_v4(),
            name: "Test".into(),
            email: "test@example.com".into(),
            password_hash: "secret-hash".into(),
            avatar: "https://example.com/a".into(),
            created_at: time::OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("test@example.com"));
        assert!(!json.contains("secret-hash"));
    }
}
