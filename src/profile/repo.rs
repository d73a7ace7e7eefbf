use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::profile::dto::ProfileUpdate;

/// Profile record, 1:1 with a user. `user_id` is never updated after the
/// row is created.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub bio: Option<String>,
    pub phone: Option<String>,
    pub favorite_style: Option<String>,
    pub profile_picture: Option<String>,
    pub updated_at: OffsetDateTime,
}

impl Profile {
    pub async fn find_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, user_id, bio, phone, favorite_style, profile_picture, updated_at
            FROM user_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(profile)
    }

    /// Insert an empty profile row for `user_id`.
    pub async fn create(db: &PgPool, user_id: Uuid) -> anyhow::Result<Profile> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO user_profiles (user_id)
            VALUES ($1)
            RETURNING id, user_id, bio, phone, favorite_style, profile_picture, updated_at
            "#,
        )
        .bind(user_id)
        .fetch_one(db)
        .await?;
        Ok(profile)
    }

    /// Profiles are created lazily on first authenticated access.
    pub async fn get_or_create(db: &PgPool, user_id: Uuid) -> anyhow::Result<Profile> {
        if let Some(profile) = Self::find_by_user(db, user_id).await? {
            return Ok(profile);
        }
        Self::create(db, user_id).await
    }

    /// Merge a partial update over the stored values; absent fields keep
    /// what is already there.
    pub fn merged_with(&self, update: &ProfileUpdate) -> Profile {
        Profile {
            bio: update.bio.clone().or_else(|| self.bio.clone()),
            phone: update.phone.clone().or_else(|| self.phone.clone()),
            favorite_style: update
                .favorite_style
                .clone()
                .or_else(|| self.favorite_style.clone()),
            ..self.clone()
        }
    }

    /// Write the merged field values and bump `updated_at`.
    pub async fn save_fields(
        db: &PgPool,
        user_id: Uuid,
        bio: Option<&str>,
        phone: Option<&str>,
        favorite_style: Option<&str>,
    ) -> anyhow::Result<Profile> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            UPDATE user_profiles
            SET bio = $2,
                phone = $3,
                favorite_style = $4,
                updated_at = now()
            WHERE user_id = $1
            RETURNING id, user_id, bio, phone, favorite_style, profile_picture, updated_at
            "#,
        )
        .bind(user_id)
        .bind(bio)
        .bind(phone)
        .bind(favorite_style)
        .fetch_one(db)
        .await?;
        Ok(profile)
    }

    /// Point the profile at a newly stored picture.
    pub async fn set_picture(db: &PgPool, user_id: Uuid, path: &str) -> anyhow::Result<Profile> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            UPDATE user_profiles
            SET profile_picture = $2,
                updated_at = now()
            WHERE user_id = $1
            RETURNING id, user_id, bio, phone, favorite_style, profile_picture, updated_at
            "#,
        )
        .bind(user_id)
        .bind(path)
        .fetch_one(db)
        .await?;
        Ok(profile)
    }
}
