//! Document-oriented adapter. Profiles and posts are held as whole documents
//! with their nested collections embedded, and every operation runs as one
//! mutation under a single write lock, so sub-entry updates cannot race.

use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::StoreError;

use super::models::{
    Comment, Education, EducationInput, Experience, ExperienceInput, Like, NewUser, Post, Profile,
    ProfileOwner, ProfileUpdate, User,
};
use super::{PostStore, ProfileStore, UserStore};

/// Profile document without the joined owner fields.
#[derive(Debug, Clone)]
struct ProfileDoc {
    id: Uuid,
    user_id: Uuid,
    company: Option<String>,
    website: Option<String>,
    location: Option<String>,
    bio: Option<String>,
    status: String,
    github_username: Option<String>,
    skills: Vec<String>,
    social: super::models::SocialLinks,
    experience: Vec<Experience>,
    education: Vec<Education>,
    created_at: OffsetDateTime,
}

#[derive(Debug, Default)]
struct Documents {
    users: HashMap<Uuid, User>,
    // keyed by profile id; one per user, enforced on insert
    profiles: HashMap<Uuid, ProfileDoc>,
    // newest first
    posts: Vec<Post>,
}

impl Documents {
    fn join_profile(&self, doc: &ProfileDoc) -> Result<Profile, StoreError> {
        let owner = self.users.get(&doc.user_id).ok_or(StoreError::NotFound)?;
        Ok(Profile {
            id: doc.id,
            user_id: doc.user_id,
            user: ProfileOwner {
                name: owner.name.clone(),
                avatar: owner.avatar.clone(),
            },
            company: doc.company.clone(),
            website: doc.website.clone(),
            location: doc.location.clone(),
            bio: doc.bio.clone(),
            status: doc.status.clone(),
            github_username: doc.github_username.clone(),
            skills: doc.skills.clone(),
            social: doc.social.clone(),
            experience: doc.experience.clone(),
            education: doc.education.clone(),
            created_at: doc.created_at,
        })
    }

    fn profile_doc_by_user(&mut self, user_id: Uuid) -> Option<&mut ProfileDoc> {
        self.profiles.values_mut().find(|p| p.user_id == user_id)
    }

    fn post_mut(&mut self, id: Uuid) -> Result<&mut Post, StoreError> {
        self.posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StoreError::NotFound)
    }
}

#[derive(Default)]
pub struct MemStore {
    docs: RwLock<Documents>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemStore {
    async fn create_user(&self, new: NewUser) -> Result<User, StoreError> {
        let mut docs = self.docs.write().await;
        if docs.users.values().any(|u| u.email == new.email) {
            return Err(StoreError::Conflict);
        }
        let user = User {
            id: Uuid::new_v4(),
            name: new.name,
            email: new.email,
            password_hash: new.password_hash,
            avatar: new.avatar,
            created_at: OffsetDateTime::now_utc(),
        };
        docs.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn user_by_id(&self, id: Uuid) -> Result<User, StoreError> {
        let docs = self.docs.read().await;
        docs.users.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let docs = self.docs.read().await;
        Ok(docs.users.values().find(|u| u.email == email).cloned())
    }

    async fn delete_user(&self, id: Uuid) -> Result<(), StoreError> {
        let mut docs = self.docs.write().await;
        docs.users.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for MemStore {
    async fn upsert_profile(
        &self,
        user_id: Uuid,
        update: ProfileUpdate,
    ) -> Result<Profile, StoreError> {
        let mut docs = self.docs.write().await;
        if !docs.users.contains_key(&user_id) {
            return Err(StoreError::NotFound);
        }
        if let Some(doc) = docs.profile_doc_by_user(user_id) {
            if update.company.is_some() {
                doc.company = update.company;
            }
            if update.website.is_some() {
                doc.website = update.website;
            }
            if update.location.is_some() {
                doc.location = update.location;
            }
            if update.bio.is_some() {
                doc.bio = update.bio;
            }
            if update.github_username.is_some() {
                doc.github_username = update.github_username;
            }
            doc.status = update.status;
            doc.skills = update.skills;
            doc.social.merge(update.social);
            let doc = doc.clone();
            return docs.join_profile(&doc);
        }
        let doc = ProfileDoc {
            id: Uuid::new_v4(),
            user_id,
            company: update.company,
            website: update.website,
            location: update.location,
            bio: update.bio,
            status: update.status,
            github_username: update.github_username,
            skills: update.skills,
            social: update.social,
            experience: Vec::new(),
            education: Vec::new(),
            created_at: OffsetDateTime::now_utc(),
        };
        docs.profiles.insert(doc.id, doc.clone());
        docs.join_profile(&doc)
    }

    async fn profile_by_user(&self, user_id: Uuid) -> Result<Profile, StoreError> {
        let docs = self.docs.read().await;
        let doc = docs
            .profiles
            .values()
            .find(|p| p.user_id == user_id)
            .ok_or(StoreError::NotFound)?;
        docs.join_profile(doc)
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>, StoreError> {
        let docs = self.docs.read().await;
        let mut out = Vec::with_capacity(docs.profiles.len());
        for doc in docs.profiles.values() {
            // skip orphans mid-account-deletion rather than failing the list
            if let Ok(profile) = docs.join_profile(doc) {
                out.push(profile);
            }
        }
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    async fn add_experience(
        &self,
        user_id: Uuid,
        entry: ExperienceInput,
    ) -> Result<Profile, StoreError> {
        let mut docs = self.docs.write().await;
        let doc = docs.profile_doc_by_user(user_id).ok_or(StoreError::NotFound)?;
        doc.experience.insert(
            0,
            Experience {
                id: Uuid::new_v4(),
                title: entry.title,
                company: entry.company,
                location: entry.location,
                from: entry.from,
                to: entry.to,
                current: entry.current,
                description: entry.description,
            },
        );
        let doc = doc.clone();
        docs.join_profile(&doc)
    }

    async fn update_experience(
        &self,
        profile_id: Uuid,
        exp_id: Uuid,
        entry: ExperienceInput,
    ) -> Result<Profile, StoreError> {
        let mut docs = self.docs.write().await;
        let doc = docs.profiles.get_mut(&profile_id).ok_or(StoreError::NotFound)?;
        let exp = doc
            .experience
            .iter_mut()
            .find(|e| e.id == exp_id)
            .ok_or(StoreError::NotFound)?;
        exp.title = entry.title;
        exp.company = entry.company;
        exp.location = entry.location;
        exp.from = entry.from;
        exp.to = entry.to;
        exp.current = entry.current;
        exp.description = entry.description;
        let doc = doc.clone();
        docs.join_profile(&doc)
    }

    async fn remove_experience(&self, user_id: Uuid, exp_id: Uuid) -> Result<Profile, StoreError> {
        let mut docs = self.docs.write().await;
        let doc = docs.profile_doc_by_user(user_id).ok_or(StoreError::NotFound)?;
        let idx = doc
            .experience
            .iter()
            .position(|e| e.id == exp_id)
            .ok_or(StoreError::NotFound)?;
        doc.experience.remove(idx);
        let doc = doc.clone();
        docs.join_profile(&doc)
    }

    async fn add_education(
        &self,
        user_id: Uuid,
        entry: EducationInput,
    ) -> Result<Profile, StoreError> {
        let mut docs = self.docs.write().await;
        let doc = docs.profile_doc_by_user(user_id).ok_or(StoreError::NotFound)?;
        doc.education.insert(
            0,
            Education {
                id: Uuid::new_v4(),
                school: entry.school,
                degree: entry.degree,
                field_of_study: entry.field_of_study,
                from: entry.from,
                to: entry.to,
                current: entry.current,
                description: entry.description,
            },
        );
        let doc = doc.clone();
        docs.join_profile(&doc)
    }

    async fn update_education(
        &self,
        profile_id: Uuid,
        edu_id: Uuid,
        entry: EducationInput,
    ) -> Result<Profile, StoreError> {
        let mut docs = self.docs.write().await;
        let doc = docs.profiles.get_mut(&profile_id).ok_or(StoreError::NotFound)?;
        let edu = doc
            .education
            .iter_mut()
            .find(|e| e.id == edu_id)
            .ok_or(StoreError::NotFound)?;
        edu.school = entry.school;
        edu.degree = entry.degree;
        edu.field_of_study = entry.field_of_study;
        edu.from = entry.from;
        edu.to = entry.to;
        edu.current = entry.current;
        edu.description = entry.description;
        let doc = doc.clone();
        docs.join_profile(&doc)
    }

    async fn remove_education(&self, user_id: Uuid, edu_id: Uuid) -> Result<Profile, StoreError> {
        let mut docs = self.docs.write().await;
        let doc = docs.profile_doc_by_user(user_id).ok_or(StoreError::NotFound)?;
        let idx = doc
            .education
            .iter()
            .position(|e| e.id == edu_id)
            .ok_or(StoreError::NotFound)?;
        doc.education.remove(idx);
        let doc = doc.clone();
        docs.join_profile(&doc)
    }

    async fn delete_profile(&self, user_id: Uuid) -> Result<(), StoreError> {
        let mut docs = self.docs.write().await;
        docs.profiles.retain(|_, p| p.user_id != user_id);
        Ok(())
    }
}

#[async_trait]
impl PostStore for MemStore {
    async fn create_post(&self, author: &User, text: &str) -> Result<Post, StoreError> {
        let mut docs = self.docs.write().await;
        let post = Post {
            id: Uuid::new_v4(),
            user: author.id,
            name: author.name.clone(),
            avatar: author.avatar.clone(),
            text: text.to_string(),
            likes: Vec::new(),
            comments: Vec::new(),
            created_at: OffsetDateTime::now_utc(),
        };
        docs.posts.insert(0, post.clone());
        Ok(post)
    }

    async fn list_posts(&self) -> Result<Vec<Post>, StoreError> {
        let docs = self.docs.read().await;
        Ok(docs.posts.clone())
    }

    async fn post_by_id(&self, id: Uuid) -> Result<Post, StoreError> {
        let docs = self.docs.read().await;
        docs.posts
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update_post_text(&self, id: Uuid, text: &str) -> Result<Post, StoreError> {
        let mut docs = self.docs.write().await;
        let post = docs.post_mut(id)?;
        post.text = text.to_string();
        Ok(post.clone())
    }

    async fn delete_post(&self, id: Uuid, requester: Uuid) -> Result<(), StoreError> {
        let mut docs = self.docs.write().await;
        let post = docs.post_mut(id)?;
        if post.user != requester {
            return Err(StoreError::Forbidden);
        }
        docs.posts.retain(|p| p.id != id);
        Ok(())
    }

    async fn like_post(&self, id: Uuid, user_id: Uuid) -> Result<Vec<Like>, StoreError> {
        let mut docs = self.docs.write().await;
        let post = docs.post_mut(id)?;
        if post.likes.iter().any(|l| l.user == user_id) {
            return Err(StoreError::Conflict);
        }
        post.likes.insert(
            0,
            Like {
                user: user_id,
                created_at: OffsetDateTime::now_utc(),
            },
        );
        Ok(post.likes.clone())
    }

    async fn unlike_post(&self, id: Uuid, user_id: Uuid) -> Result<Vec<Like>, StoreError> {
        let mut docs = self.docs.write().await;
        let post = docs.post_mut(id)?;
        let idx = post
            .likes
            .iter()
            .position(|l| l.user == user_id)
            .ok_or(StoreError::Conflict)?;
        post.likes.remove(idx);
        Ok(post.likes.clone())
    }

    async fn add_comment(
        &self,
        id: Uuid,
        author: &User,
        text: &str,
    ) -> Result<Vec<Comment>, StoreError> {
        let mut docs = self.docs.write().await;
        let post = docs.post_mut(id)?;
        post.comments.insert(
            0,
            Comment {
                id: Uuid::new_v4(),
                user: author.id,
                name: author.name.clone(),
                avatar: author.avatar.clone(),
                text: text.to_string(),
                created_at: OffsetDateTime::now_utc(),
            },
        );
        Ok(post.comments.clone())
    }

    async fn update_comment(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
        text: &str,
    ) -> Result<Post, StoreError> {
        let mut docs = self.docs.write().await;
        let post = docs.post_mut(post_id)?;
        let comment = post
            .comments
            .iter_mut()
            .find(|c| c.id == comment_id)
            .ok_or(StoreError::NotFound)?;
        comment.text = text.to_string();
        Ok(post.clone())
    }

    async fn remove_comment(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
        requester: Uuid,
    ) -> Result<Vec<Comment>, StoreError> {
        let mut docs = self.docs.write().await;
        let post = docs.post_mut(post_id)?;
        let idx = post
            .comments
            .iter()
            .position(|c| c.id == comment_id)
            .ok_or(StoreError::NotFound)?;
        if post.comments[idx].user != requester {
            return Err(StoreError::Forbidden);
        }
        post.comments.remove(idx);
        Ok(post.comments.clone())
    }

    async fn delete_posts_by_author(&self, user_id: Uuid) -> Result<(), StoreError> {
        let mut docs = self.docs.write().await;
        docs.posts.retain(|p| p.user != user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::models::SocialLinks;

    async fn seed_user(store: &MemStore, email: &str) -> User {
        store
            .create_user(NewUser {
                name: "Test User".into(),
                email: email.into(),
                password_hash: "hash".into(),
                avatar: "https://example.com/a".into(),
            })
            .await
            .expect("create user")
    }

    fn base_update(status: &str) -> ProfileUpdate {
        ProfileUpdate {
            status: status.into(),
            skills: vec!["rust".into()],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let store = MemStore::new();
        seed_user(&store, "dup@example.com").await;
        let err = store
            .create_user(NewUser {
                name: "Other".into(),
                email: "dup@example.com".into(),
                password_hash: "hash2".into(),
                avatar: "x".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict));
        // first record unaffected
        let existing = store
            .user_by_email("dup@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(existing.name, "Test User");
    }

    #[tokio::test]
    async fn upsert_merges_partial_updates() {
        let store = MemStore::new();
        let user = seed_user(&store, "merge@example.com").await;

        let mut first = base_update("dev");
        first.company = Some("Acme".into());
        store.upsert_profile(user.id, first).await.unwrap();

        let mut second = base_update("dev");
        second.bio = Some("hello".into());
        let profile = store.upsert_profile(user.id, second).await.unwrap();

        assert_eq!(profile.company.as_deref(), Some("Acme"));
        assert_eq!(profile.bio.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn social_keys_merge_individually() {
        let store = MemStore::new();
        let user = seed_user(&store, "social@example.com").await;

        let mut first = base_update("dev");
        first.social = SocialLinks {
            twitter: Some("https://twitter.com/a".into()),
            ..Default::default()
        };
        store.upsert_profile(user.id, first).await.unwrap();

        let mut second = base_update("dev");
        second.social = SocialLinks {
            youtube: Some("https://youtube.com/a".into()),
            ..Default::default()
        };
        let profile = store.upsert_profile(user.id, second).await.unwrap();

        assert!(profile.social.twitter.is_some());
        assert!(profile.social.youtube.is_some());
    }

    #[tokio::test]
    async fn double_like_is_a_conflict_and_count_unchanged() {
        let store = MemStore::new();
        let author = seed_user(&store, "author@example.com").await;
        let post = store.create_post(&author, "hello").await.unwrap();

        let likes = store.like_post(post.id, author.id).await.unwrap();
        assert_eq!(likes.len(), 1);
        let err = store.like_post(post.id, author.id).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict));
        let post = store.post_by_id(post.id).await.unwrap();
        assert_eq!(post.likes.len(), 1);
    }

    #[tokio::test]
    async fn comment_removal_matches_id_not_author_position() {
        let store = MemStore::new();
        let author = seed_user(&store, "commenter@example.com").await;
        let post = store.create_post(&author, "hello").await.unwrap();

        store.add_comment(post.id, &author, "first").await.unwrap();
        let comments = store.add_comment(post.id, &author, "second").await.unwrap();
        // newest-first: comments[0] is "second", comments[1] is "first"
        let first_id = comments[1].id;

        let remaining = store
            .remove_comment(post.id, first_id, author.id)
            .await
            .unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].text, "second");
    }

    #[tokio::test]
    async fn removing_unknown_experience_keeps_order() {
        let store = MemStore::new();
        let user = seed_user(&store, "exp@example.com").await;
        store.upsert_profile(user.id, base_update("dev")).await.unwrap();

        let entry = |title: &str| ExperienceInput {
            title: title.into(),
            company: "Acme".into(),
            location: None,
            from: "2020-01-01".into(),
            to: None,
            current: true,
            description: None,
        };
        store.add_experience(user.id, entry("older")).await.unwrap();
        let profile = store.add_experience(user.id, entry("newer")).await.unwrap();
        assert_eq!(profile.experience[0].title, "newer");

        let err = store
            .remove_experience(user.id, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound));

        let profile = store.profile_by_user(user.id).await.unwrap();
        let titles: Vec<_> = profile.experience.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["newer", "older"]);
    }
}
