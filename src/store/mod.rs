//! Storage capability interface. Handlers talk to `dyn Store`; the two
//! adapters (relational Postgres, in-memory document store) each implement
//! the full semantics, including atomic sub-entry mutation by stable id.

pub mod models;

mod memory;
mod postgres;

pub use memory::MemStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreError;
use models::{
    Comment, EducationInput, ExperienceInput, Like, NewUser, Post, Profile, ProfileUpdate, User,
};

#[async_trait]
pub trait UserStore {
    /// Persist a new user. Fails with `Conflict` if the email is taken.
    async fn create_user(&self, new: NewUser) -> Result<User, StoreError>;
    async fn user_by_id(&self, id: Uuid) -> Result<User, StoreError>;
    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn delete_user(&self, id: Uuid) -> Result<(), StoreError>;
}

#[async_trait]
pub trait ProfileStore {
    /// Create-if-absent, else partial merge keyed by owner. Only provided
    /// fields overwrite; social keys merge individually.
    async fn upsert_profile(
        &self,
        user_id: Uuid,
        update: ProfileUpdate,
    ) -> Result<Profile, StoreError>;
    async fn profile_by_user(&self, user_id: Uuid) -> Result<Profile, StoreError>;
    async fn list_profiles(&self) -> Result<Vec<Profile>, StoreError>;

    /// Prepend an entry with a fresh stable id; newest entries come first.
    async fn add_experience(
        &self,
        user_id: Uuid,
        entry: ExperienceInput,
    ) -> Result<Profile, StoreError>;
    /// Conditional in-place update matching the entry id; position is kept.
    async fn update_experience(
        &self,
        profile_id: Uuid,
        exp_id: Uuid,
        entry: ExperienceInput,
    ) -> Result<Profile, StoreError>;
    /// Remove the entry matching the id; `NotFound` if it does not exist.
    async fn remove_experience(&self, user_id: Uuid, exp_id: Uuid) -> Result<Profile, StoreError>;

    async fn add_education(
        &self,
        user_id: Uuid,
        entry: EducationInput,
    ) -> Result<Profile, StoreError>;
    async fn update_education(
        &self,
        profile_id: Uuid,
        edu_id: Uuid,
        entry: EducationInput,
    ) -> Result<Profile, StoreError>;
    async fn remove_education(&self, user_id: Uuid, edu_id: Uuid) -> Result<Profile, StoreError>;

    /// Idempotent: deleting an absent profile is not an error.
    async fn delete_profile(&self, user_id: Uuid) -> Result<(), StoreError>;
}

#[async_trait]
pub trait PostStore {
    async fn create_post(&self, author: &User, text: &str) -> Result<Post, StoreError>;
    async fn list_posts(&self) -> Result<Vec<Post>, StoreError>;
    async fn post_by_id(&self, id: Uuid) -> Result<Post, StoreError>;
    async fn update_post_text(&self, id: Uuid, text: &str) -> Result<Post, StoreError>;
    /// `Forbidden` unless the requester authored the post.
    async fn delete_post(&self, id: Uuid, requester: Uuid) -> Result<(), StoreError>;

    /// `Conflict` if the user already liked the post.
    async fn like_post(&self, id: Uuid, user_id: Uuid) -> Result<Vec<Like>, StoreError>;
    /// `Conflict` if the user has no like to remove.
    async fn unlike_post(&self, id: Uuid, user_id: Uuid) -> Result<Vec<Like>, StoreError>;

    async fn add_comment(
        &self,
        id: Uuid,
        author: &User,
        text: &str,
    ) -> Result<Vec<Comment>, StoreError>;
    async fn update_comment(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
        text: &str,
    ) -> Result<Post, StoreError>;
    /// Removal matches the comment id only, never the author's position in
    /// the list; `Forbidden` unless the requester wrote the comment.
    async fn remove_comment(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
        requester: Uuid,
    ) -> Result<Vec<Comment>, StoreError>;

    async fn delete_posts_by_author(&self, user_id: Uuid) -> Result<(), StoreError>;
}

pub trait Store: UserStore + ProfileStore + PostStore + Send + Sync {}

impl<T> Store for T where T: UserStore + ProfileStore + PostStore + Send + Sync {}
