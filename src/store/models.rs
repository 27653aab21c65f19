use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// User record. The password hash never leaves the server in JSON.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub avatar: String,
    pub created_at: OffsetDateTime,
}

/// Fields needed to persist a new user; the store assigns id and timestamp.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub avatar: String,
}

/// Display fields of the profile owner, denormalized into profile responses.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileOwner {
    pub name: String,
    pub avatar: String,
}

/// Sparse map of social links. Only keys the user has set are serialized,
/// and on update only provided keys overwrite.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub youtube: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
}

impl SocialLinks {
    /// Overwrite only the keys present in `other`, leave the rest untouched.
    pub fn merge(&mut self, other: SocialLinks) {
        if other.youtube.is_some() {
            self.youtube = other.youtube;
        }
        if other.twitter.is_some() {
            self.twitter = other.twitter;
        }
        if other.facebook.is_some() {
            self.facebook = other.facebook;
        }
        if other.linkedin.is_some() {
            self.linkedin = other.linkedin;
        }
        if other.instagram.is_some() {
            self.instagram = other.instagram;
        }
    }
}

/// Work history entry, addressed by its stable id rather than position.
#[derive(Debug, Clone, Serialize)]
pub struct Experience {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub from: String,
    pub to: Option<String>,
    pub current: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ExperienceInput {
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub from: String,
    pub to: Option<String>,
    pub current: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Education {
    pub id: Uuid,
    pub school: String,
    pub degree: String,
    pub field_of_study: String,
    pub from: String,
    pub to: Option<String>,
    pub current: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EducationInput {
    pub school: String,
    pub degree: String,
    pub field_of_study: String,
    pub from: String,
    pub to: Option<String>,
    pub current: bool,
    pub description: Option<String>,
}

/// One profile per user. Experience and education are ordered newest-first.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user: ProfileOwner,
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub status: String,
    pub github_username: Option<String>,
    pub skills: Vec<String>,
    pub social: SocialLinks,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub created_at: OffsetDateTime,
}

/// Partial profile update. `None` string fields are left untouched on an
/// existing profile; status and skills are always provided by the API.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub status: String,
    pub github_username: Option<String>,
    pub skills: Vec<String>,
    pub social: SocialLinks,
}

/// A like, unique per user within a post's like set.
#[derive(Debug, Clone, Serialize)]
pub struct Like {
    pub user: Uuid,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct Comment {
    pub id: Uuid,
    pub user: Uuid,
    pub name: String,
    pub avatar: String,
    pub text: String,
    pub created_at: OffsetDateTime,
}

/// Post with the author's display fields snapshotted at creation time.
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    pub id: Uuid,
    pub user: Uuid,
    pub name: String,
    pub avatar: String,
    pub text: String,
    pub likes: Vec<Like>,
    pub comments: Vec<Comment>,
    pub created_at: OffsetDateTime,
}
