use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("Profile not found")]
    ProfileNotFound,
    #[error("A profile with this email already exists")]
    EmailTaken,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Profile {
    pub id: Uuid,
    pub display_name: String,
    pub email: String,
    pub push_token: Option<String>,
    #[ts(type = "Date")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "Date")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, TS)]
pub struct CreateProfile {
    pub display_name: String,
    pub email: String,
}

#[derive(Debug, Deserialize, TS)]
pub struct UpdateProfile {
    pub display_name: Option<String>,
    pub push_token: Option<String>,
}

impl Profile {
    pub async fn create(
        pool: &SqlitePool,
        data: &CreateProfile,
        profile_id: Uuid,
    ) -> Result<Self, ProfileError> {
        sqlx::query_as::<_, Profile>(
            r#"INSERT INTO profiles (id, display_name, email)
               VALUES ($1, $2, $3)
               RETURNING id, display_name, email, push_token, created_at, updated_at"#,
        )
        .bind(profile_id)
        .bind(&data.display_name)
        .bind(&data.email)
        .fetch_one(pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                ProfileError::EmailTaken
            }
            _ => ProfileError::Database(e),
        })
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Profile>(
            r#"SELECT id, display_name, email, push_token, created_at, updated_at
               FROM profiles
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Profile>(
            r#"SELECT id, display_name, email, push_token, created_at, updated_at
               FROM profiles
               WHERE email = $1"#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await
    }

    /// Partial update; absent fields keep their current value.
    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateProfile,
    ) -> Result<Self, ProfileError> {
        sqlx::query_as::<_, Profile>(
            r#"UPDATE profiles
               SET display_name = COALESCE($2, display_name),
                   push_token = COALESCE($3, push_token),
                   updated_at = datetime('now', 'subsec')
               WHERE id = $1
               RETURNING id, display_name, email, push_token, created_at, updated_at"#,
        )
        .bind(id)
        .bind(&data.display_name)
        .bind(&data.push_token)
        .fetch_optional(pool)
        .await?
        .ok_or(ProfileError::ProfileNotFound)
    }

    pub async fn exists(pool: &SqlitePool, id: Uuid) -> Result<bool, sqlx::Error> {
        let count: i64 =
            sqlx::query_scalar(r#"SELECT COUNT(*) FROM profiles WHERE id = $1"#)
                .bind(id)
                .fetch_one(pool)
                .await?;
        Ok(count > 0)
    }
}
