use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::tokens::AuthUser;
use crate::error::{ApiError, FieldError, StoreError};
use crate::state::AppState;
use crate::store::models::{Profile, ProfileUpdate};
use crate::store::{PostStore, ProfileStore, UserStore};

use super::dto::{parse_skills, EducationRequest, ExperienceRequest, UpsertProfileRequest};

#[instrument(skip(state))]
pub async fn me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Profile>, ApiError> {
    let profile = state
        .store
        .profile_by_user(user_id)
        .await
        .map_err(|e| match e {
            StoreError::NotFound => ApiError::not_found("There is no profile for this user."),
            other => other.into(),
        })?;
    Ok(Json(profile))
}

#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Profile>>, ApiError> {
    let profiles = state.store.list_profiles().await?;
    Ok(Json(profiles))
}

#[instrument(skip(state))]
pub async fn by_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Profile>, ApiError> {
    let profile = state
        .store
        .profile_by_user(user_id)
        .await
        .map_err(|e| match e {
            StoreError::NotFound => ApiError::not_found("Profile not found."),
            other => other.into(),
        })?;
    Ok(Json(profile))
}

#[instrument(skip(state, payload))]
pub async fn upsert(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpsertProfileRequest>,
) -> Result<Json<Profile>, ApiError> {
    let mut errors = Vec::new();
    if payload.status.as_deref().map_or(true, |s| s.trim().is_empty()) {
        errors.push(FieldError {
            field: "status",
            msg: "Status is required.",
        });
    }
    if payload.skills.as_deref().map_or(true, |s| s.trim().is_empty()) {
        errors.push(FieldError {
            field: "skills",
            msg: "Skills is required.",
        });
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let social = payload.social();
    let update = ProfileUpdate {
        company: payload.company,
        website: payload.website,
        location: payload.location,
        bio: payload.bio,
        status: payload.status.unwrap_or_default(),
        github_username: payload.github_username,
        skills: parse_skills(payload.skills.as_deref().unwrap_or_default()),
        social,
    };

    let profile = state.store.upsert_profile(user_id, update).await?;
    info!(user_id = %user_id, "profile upserted");
    Ok(Json(profile))
}

#[instrument(skip(state))]
pub async fn delete_account(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Value>, ApiError> {
    state.store.delete_posts_by_author(user_id).await?;
    state.store.delete_profile(user_id).await?;
    state.store.delete_user(user_id).await?;
    info!(user_id = %user_id, "account deleted");
    Ok(Json(json!({ "msg": "User has been deleted." })))
}

fn validate_experience(payload: &ExperienceRequest) -> Result<(), ApiError> {
    let mut errors = Vec::new();
    if payload.title.as_deref().map_or(true, |s| s.trim().is_empty()) {
        errors.push(FieldError {
            field: "title",
            msg: "Title is required.",
        });
    }
    if payload.company.as_deref().map_or(true, |s| s.trim().is_empty()) {
        errors.push(FieldError {
            field: "company",
            msg: "Company is required.",
        });
    }
    if payload.from.as_deref().map_or(true, |s| s.trim().is_empty()) {
        errors.push(FieldError {
            field: "from",
            msg: "From date is required.",
        });
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

fn validate_education(payload: &EducationRequest) -> Result<(), ApiError> {
    let mut errors = Vec::new();
    if payload.school.as_deref().map_or(true, |s| s.trim().is_empty()) {
        errors.push(FieldError {
            field: "school",
            msg: "School is required.",
        });
    }
    if payload.degree.as_deref().map_or(true, |s| s.trim().is_empty()) {
        errors.push(FieldError {
            field: "degree",
            msg: "Degree is required.",
        });
    }
    if payload
        .field_of_study
        .as_deref()
        .map_or(true, |s| s.trim().is_empty())
    {
        errors.push(FieldError {
            field: "field_of_study",
            msg: "Field of study is required.",
        });
    }
    if payload.from.as_deref().map_or(true, |s| s.trim().is_empty()) {
        errors.push(FieldError {
            field: "from",
            msg: "From date is required.",
        });
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

fn no_profile(e: StoreError) -> ApiError {
    match e {
        StoreError::NotFound => ApiError::not_found("There is no profile for this user."),
        other => other.into(),
    }
}

#[instrument(skip(state, payload))]
pub async fn add_experience(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<ExperienceRequest>,
) -> Result<Json<Profile>, ApiError> {
    validate_experience(&payload)?;
    let profile = state
        .store
        .add_experience(user_id, payload.into_input())
        .await
        .map_err(no_profile)?;
    Ok(Json(profile))
}

#[instrument(skip(state, payload))]
pub async fn update_experience(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path((profile_id, exp_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<ExperienceRequest>,
) -> Result<Json<Profile>, ApiError> {
    validate_experience(&payload)?;
    let profile = state
        .store
        .update_experience(profile_id, exp_id, payload.into_input())
        .await
        .map_err(|e| match e {
            StoreError::NotFound => ApiError::not_found("Experience entry not found."),
            other => other.into(),
        })?;
    Ok(Json(profile))
}

#[instrument(skip(state))]
pub async fn remove_experience(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(exp_id): Path<Uuid>,
) -> Result<Json<Profile>, ApiError> {
    let profile = state
        .store
        .remove_experience(user_id, exp_id)
        .await
        .map_err(|e| match e {
            StoreError::NotFound => ApiError::not_found("Experience entry not found."),
            other => other.into(),
        })?;
    Ok(Json(profile))
}

#[instrument(skip(state, payload))]
pub async fn add_education(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<EducationRequest>,
) -> Result<Json<Profile>, ApiError> {
    validate_education(&payload)?;
    let profile = state
        .store
        .add_education(user_id, payload.into_input())
        .await
        .map_err(no_profile)?;
    Ok(Json(profile))
}

#[instrument(skip(state, payload))]
pub async fn update_education(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path((profile_id, edu_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<EducationRequest>,
) -> Result<Json<Profile>, ApiError> {
    validate_education(&payload)?;
    let profile = state
        .store
        .update_education(profile_id, edu_id, payload.into_input())
        .await
        .map_err(|e| match e {
            StoreError::NotFound => ApiError::not_found("Education entry not found."),
            other => other.into(),
        })?;
    Ok(Json(profile))
}

#[instrument(skip(state))]
pub async fn remove_education(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(edu_id): Path<Uuid>,
) -> Result<Json<Profile>, ApiError> {
    let profile = state
        .store
        .remove_education(user_id, edu_id)
        .await
        .map_err(|e| match e {
            StoreError::NotFound => ApiError::not_found("Education entry not found."),
            other => other.into(),
        })?;
    Ok(Json(profile))
}
