//! Relational adapter. Nested collections live in their own tables, so the
//! conditional `WHERE id = $n` updates and deletes the trait requires are
//! single atomic statements; `rows_affected` distinguishes a miss from a hit.
//! `seq` columns order each collection newest-first, which is "prepend"
//! without relying on timestamp ties.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::StoreError;

use super::models::{
    Comment, Education, EducationInput, Experience, ExperienceInput, Like, NewUser, Post, Profile,
    ProfileOwner, ProfileUpdate, SocialLinks, User,
};
use super::{PostStore, ProfileStore, UserStore};

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    avatar: String,
    created_at: OffsetDateTime,
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        User {
            id: r.id,
            name: r.name,
            email: r.email,
            password_hash: r.password_hash,
            avatar: r.avatar,
            created_at: r.created_at,
        }
    }
}

#[derive(FromRow)]
struct ProfileRow {
    id: Uuid,
    user_id: Uuid,
    company: Option<String>,
    website: Option<String>,
    location: Option<String>,
    bio: Option<String>,
    status: String,
    github_username: Option<String>,
    skills: Vec<String>,
    social: sqlx::types::Json<SocialLinks>,
    created_at: OffsetDateTime,
    owner_name: String,
    owner_avatar: String,
}

#[derive(FromRow)]
struct ExperienceRow {
    id: Uuid,
    title: String,
    company: String,
    location: Option<String>,
    from_date: String,
    to_date: Option<String>,
    current: bool,
    description: Option<String>,
}

impl From<ExperienceRow> for Experience {
    fn from(r: ExperienceRow) -> Self {
        Experience {
            id: r.id,
            title: r.title,
            company: r.company,
            location: r.location,
            from: r.from_date,
            to: r.to_date,
            current: r.current,
            description: r.description,
        }
    }
}

#[derive(FromRow)]
struct EducationRow {
    id: Uuid,
    school: String,
    degree: String,
    field_of_study: String,
    from_date: String,
    to_date: Option<String>,
    current: bool,
    description: Option<String>,
}

impl From<EducationRow> for Education {
    fn from(r: EducationRow) -> Self {
        Education {
            id: r.id,
            school: r.school,
            degree: r.degree,
            field_of_study: r.field_of_study,
            from: r.from_date,
            to: r.to_date,
            current: r.current,
            description: r.description,
        }
    }
}

#[derive(FromRow)]
struct PostRow {
    id: Uuid,
    user_id: Uuid,
    name: String,
    avatar: String,
    text: String,
    created_at: OffsetDateTime,
}

#[derive(FromRow)]
struct LikeRow {
    user_id: Uuid,
    created_at: OffsetDateTime,
}

#[derive(FromRow)]
struct CommentRow {
    id: Uuid,
    user_id: Uuid,
    name: String,
    avatar: String,
    text: String,
    created_at: OffsetDateTime,
}

const PROFILE_SELECT: &str = r#"
    SELECT p.id, p.user_id, p.company, p.website, p.location, p.bio, p.status,
           p.github_username, p.skills, p.social, p.created_at,
           u.name AS owner_name, u.avatar AS owner_avatar
    FROM profiles p
    JOIN users u ON u.id = p.user_id
"#;

impl PgStore {
    async fn assemble_profile(&self, row: ProfileRow) -> Result<Profile, StoreError> {
        let experience = sqlx::query_as::<_, ExperienceRow>(
            r#"
            SELECT id, title, company, location, from_date, to_date, current, description
            FROM experience
            WHERE profile_id = $1
            ORDER BY seq DESC
            "#,
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await?;

        let education = sqlx::query_as::<_, EducationRow>(
            r#"
            SELECT id, school, degree, field_of_study, from_date, to_date, current, description
            FROM education
            WHERE profile_id = $1
            ORDER BY seq DESC
            "#,
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Profile {
            id: row.id,
            user_id: row.user_id,
            user: ProfileOwner {
                name: row.owner_name,
                avatar: row.owner_avatar,
            },
            company: row.company,
            website: row.website,
            location: row.location,
            bio: row.bio,
            status: row.status,
            github_username: row.github_username,
            skills: row.skills,
            social: row.social.0,
            created_at: row.created_at,
            experience: experience.into_iter().map(Experience::from).collect(),
            education: education.into_iter().map(Education::from).collect(),
        })
    }

    async fn profile_by_id_internal(&self, profile_id: Uuid) -> Result<Profile, StoreError> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!("{PROFILE_SELECT} WHERE p.id = $1"))
            .bind(profile_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)?;
        self.assemble_profile(row).await
    }

    async fn post_exists(&self, id: Uuid) -> Result<bool, StoreError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM posts WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn likes_of(&self, post_id: Uuid) -> Result<Vec<Like>, StoreError> {
        let rows = sqlx::query_as::<_, LikeRow>(
            r#"
            SELECT user_id, created_at
            FROM post_likes
            WHERE post_id = $1
            ORDER BY seq DESC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| Like {
                user: r.user_id,
                created_at: r.created_at,
            })
            .collect())
    }

    async fn comments_of(&self, post_id: Uuid) -> Result<Vec<Comment>, StoreError> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, user_id, name, avatar, text, created_at
            FROM post_comments
            WHERE post_id = $1
            ORDER BY seq DESC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| Comment {
                id: r.id,
                user: r.user_id,
                name: r.name,
                avatar: r.avatar,
                text: r.text,
                created_at: r.created_at,
            })
            .collect())
    }

    async fn assemble_post(&self, row: PostRow) -> Result<Post, StoreError> {
        let likes = self.likes_of(row.id).await?;
        let comments = self.comments_of(row.id).await?;
        Ok(Post {
            id: row.id,
            user: row.user_id,
            name: row.name,
            avatar: row.avatar,
            text: row.text,
            likes,
            comments,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, new: NewUser) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (name, email, password_hash, avatar)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, password_hash, avatar, created_at
            "#,
        )
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.avatar)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn user_by_id(&self, id: Uuid) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, password_hash, avatar, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;
        Ok(row.into())
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, password_hash, avatar, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    async fn delete_user(&self, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for PgStore {
    async fn upsert_profile(
        &self,
        user_id: Uuid,
        update: ProfileUpdate,
    ) -> Result<Profile, StoreError> {
        // Single statement: COALESCE keeps existing values when a field was
        // not provided, and `||` merges only the provided social keys.
        let social = serde_json::to_value(&update.social)
            .map_err(|e| StoreError::Backend(e.into()))?;
        sqlx::query(
            r#"
            INSERT INTO profiles
                (user_id, company, website, location, bio, status, github_username, skills, social)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (user_id) DO UPDATE SET
                company = COALESCE(EXCLUDED.company, profiles.company),
                website = COALESCE(EXCLUDED.website, profiles.website),
                location = COALESCE(EXCLUDED.location, profiles.location),
                bio = COALESCE(EXCLUDED.bio, profiles.bio),
                status = EXCLUDED.status,
                github_username = COALESCE(EXCLUDED.github_username, profiles.github_username),
                skills = EXCLUDED.skills,
                social = profiles.social || EXCLUDED.social
            "#,
        )
        .bind(user_id)
        .bind(&update.company)
        .bind(&update.website)
        .bind(&update.location)
        .bind(&update.bio)
        .bind(&update.status)
        .bind(&update.github_username)
        .bind(&update.skills)
        .bind(&social)
        .execute(&self.pool)
        .await?;
        self.profile_by_user(user_id).await
    }

    async fn profile_by_user(&self, user_id: Uuid) -> Result<Profile, StoreError> {
        let row =
            sqlx::query_as::<_, ProfileRow>(&format!("{PROFILE_SELECT} WHERE p.user_id = $1"))
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or(StoreError::NotFound)?;
        self.assemble_profile(row).await
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>, StoreError> {
        let rows = sqlx::query_as::<_, ProfileRow>(&format!(
            "{PROFILE_SELECT} ORDER BY p.created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(self.assemble_profile(row).await?);
        }
        Ok(out)
    }

    async fn add_experience(
        &self,
        user_id: Uuid,
        entry: ExperienceInput,
    ) -> Result<Profile, StoreError> {
        let inserted: Option<(Uuid,)> = sqlx::query_as(
            r#"
            INSERT INTO experience
                (profile_id, title, company, location, from_date, to_date, current, description)
            SELECT p.id, $2, $3, $4, $5, $6, $7, $8
            FROM profiles p
            WHERE p.user_id = $1
            RETURNING profile_id
            "#,
        )
        .bind(user_id)
        .bind(&entry.title)
        .bind(&entry.company)
        .bind(&entry.location)
        .bind(&entry.from)
        .bind(&entry.to)
        .bind(entry.current)
        .bind(&entry.description)
        .fetch_optional(&self.pool)
        .await?;
        let (profile_id,) = inserted.ok_or(StoreError::NotFound)?;
        self.profile_by_id_internal(profile_id).await
    }

    async fn update_experience(
        &self,
        profile_id: Uuid,
        exp_id: Uuid,
        entry: ExperienceInput,
    ) -> Result<Profile, StoreError> {
        let updated = sqlx::query(
            r#"
            UPDATE experience
            SET title = $3, company = $4, location = $5, from_date = $6,
                to_date = $7, current = $8, description = $9
            WHERE id = $2 AND profile_id = $1
            "#,
        )
        .bind(profile_id)
        .bind(exp_id)
        .bind(&entry.title)
        .bind(&entry.company)
        .bind(&entry.location)
        .bind(&entry.from)
        .bind(&entry.to)
        .bind(entry.current)
        .bind(&entry.description)
        .execute(&self.pool)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        self.profile_by_id_internal(profile_id).await
    }

    async fn remove_experience(&self, user_id: Uuid, exp_id: Uuid) -> Result<Profile, StoreError> {
        let deleted = sqlx::query(
            r#"
            DELETE FROM experience e
            USING profiles p
            WHERE e.profile_id = p.id AND p.user_id = $1 AND e.id = $2
            "#,
        )
        .bind(user_id)
        .bind(exp_id)
        .execute(&self.pool)
        .await?;
        if deleted.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        self.profile_by_user(user_id).await
    }

    async fn add_education(
        &self,
        user_id: Uuid,
        entry: EducationInput,
    ) -> Result<Profile, StoreError> {
        let inserted: Option<(Uuid,)> = sqlx::query_as(
            r#"
            INSERT INTO education
                (profile_id, school, degree, field_of_study, from_date, to_date, current, description)
            SELECT p.id, $2, $3, $4, $5, $6, $7, $8
            FROM profiles p
            WHERE p.user_id = $1
            RETURNING profile_id
            "#,
        )
        .bind(user_id)
        .bind(&entry.school)
        .bind(&entry.degree)
        .bind(&entry.field_of_study)
        .bind(&entry.from)
        .bind(&entry.to)
        .bind(entry.current)
        .bind(&entry.description)
        .fetch_optional(&self.pool)
        .await?;
        let (profile_id,) = inserted.ok_or(StoreError::NotFound)?;
        self.profile_by_id_internal(profile_id).await
    }

    async fn update_education(
        &self,
        profile_id: Uuid,
        edu_id: Uuid,
        entry: EducationInput,
    ) -> Result<Profile, StoreError> {
        let updated = sqlx::query(
            r#"
            UPDATE education
            SET school = $3, degree = $4, field_of_study = $5, from_date = $6,
                to_date = $7, current = $8, description = $9
            WHERE id = $2 AND profile_id = $1
            "#,
        )
        .bind(profile_id)
        .bind(edu_id)
        .bind(&entry.school)
        .bind(&entry.degree)
        .bind(&entry.field_of_study)
        .bind(&entry.from)
        .bind(&entry.to)
        .bind(entry.current)
        .bind(&entry.description)
        .execute(&self.pool)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        self.profile_by_id_internal(profile_id).await
    }

    async fn remove_education(&self, user_id: Uuid, edu_id: Uuid) -> Result<Profile, StoreError> {
        let deleted = sqlx::query(
            r#"
            DELETE FROM education e
            USING profiles p
            WHERE e.profile_id = p.id AND p.user_id = $1 AND e.id = $2
            "#,
        )
        .bind(user_id)
        .bind(edu_id)
        .execute(&self.pool)
        .await?;
        if deleted.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        self.profile_by_user(user_id).await
    }

    async fn delete_profile(&self, user_id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM profiles WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl PostStore for PgStore {
    async fn create_post(&self, author: &User, text: &str) -> Result<Post, StoreError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            INSERT INTO posts (user_id, name, avatar, text)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, name, avatar, text, created_at
            "#,
        )
        .bind(author.id)
        .bind(&author.name)
        .bind(&author.avatar)
        .bind(text)
        .fetch_one(&self.pool)
        .await?;
        self.assemble_post(row).await
    }

    async fn list_posts(&self) -> Result<Vec<Post>, StoreError> {
        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, user_id, name, avatar, text, created_at
            FROM posts
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(self.assemble_post(row).await?);
        }
        Ok(out)
    }

    async fn post_by_id(&self, id: Uuid) -> Result<Post, StoreError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, user_id, name, avatar, text, created_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;
        self.assemble_post(row).await
    }

    async fn update_post_text(&self, id: Uuid, text: &str) -> Result<Post, StoreError> {
        let updated = sqlx::query("UPDATE posts SET text = $2 WHERE id = $1")
            .bind(id)
            .bind(text)
            .execute(&self.pool)
            .await?;
        if updated.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        self.post_by_id(id).await
    }

    async fn delete_post(&self, id: Uuid, requester: Uuid) -> Result<(), StoreError> {
        let deleted = sqlx::query("DELETE FROM posts WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(requester)
            .execute(&self.pool)
            .await?;
        if deleted.rows_affected() == 0 {
            return if self.post_exists(id).await? {
                Err(StoreError::Forbidden)
            } else {
                Err(StoreError::NotFound)
            };
        }
        Ok(())
    }

    async fn like_post(&self, id: Uuid, user_id: Uuid) -> Result<Vec<Like>, StoreError> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO post_likes (post_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (post_id, user_id) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        if inserted.rows_affected() == 0 {
            return Err(StoreError::Conflict);
        }
        self.likes_of(id).await
    }

    async fn unlike_post(&self, id: Uuid, user_id: Uuid) -> Result<Vec<Like>, StoreError> {
        let deleted = sqlx::query("DELETE FROM post_likes WHERE post_id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        if deleted.rows_affected() == 0 {
            return if self.post_exists(id).await? {
                Err(StoreError::Conflict)
            } else {
                Err(StoreError::NotFound)
            };
        }
        self.likes_of(id).await
    }

    async fn add_comment(
        &self,
        id: Uuid,
        author: &User,
        text: &str,
    ) -> Result<Vec<Comment>, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO post_comments (post_id, user_id, name, avatar, text)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(id)
        .bind(author.id)
        .bind(&author.name)
        .bind(&author.avatar)
        .bind(text)
        .execute(&self.pool)
        .await?;
        self.comments_of(id).await
    }

    async fn update_comment(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
        text: &str,
    ) -> Result<Post, StoreError> {
        let updated =
            sqlx::query("UPDATE post_comments SET text = $3 WHERE id = $2 AND post_id = $1")
                .bind(post_id)
                .bind(comment_id)
                .bind(text)
                .execute(&self.pool)
                .await?;
        if updated.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        self.post_by_id(post_id).await
    }

    async fn remove_comment(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
        requester: Uuid,
    ) -> Result<Vec<Comment>, StoreError> {
        let deleted = sqlx::query(
            "DELETE FROM post_comments WHERE id = $2 AND post_id = $1 AND user_id = $3",
        )
        .bind(post_id)
        .bind(comment_id)
        .bind(requester)
        .execute(&self.pool)
        .await?;
        if deleted.rows_affected() == 0 {
            let present: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM post_comments WHERE id = $2 AND post_id = $1)",
            )
            .bind(post_id)
            .bind(comment_id)
            .fetch_one(&self.pool)
            .await?;
            return if present {
                Err(StoreError::Forbidden)
            } else {
                Err(StoreError::NotFound)
            };
        }
        self.comments_of(post_id).await
    }

    async fn delete_posts_by_author(&self, user_id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM posts WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
