use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CoupleError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("Couple not found")]
    CoupleNotFound,
    #[error("Invite code is invalid or already used")]
    InviteCodeInvalid,
    #[error("Profile is already part of a couple")]
    AlreadyPaired,
}

/// A pairing of two profiles. `partner_id` stays NULL until the second
/// partner redeems the invite code.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Couple {
    pub id: Uuid,
    pub invite_code: String,
    pub created_by: Uuid,
    pub partner_id: Option<Uuid>,
    #[ts(type = "Date")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "Date")]
    pub updated_at: DateTime<Utc>,
}

impl Couple {
    /// Short shareable code, 8 uppercase hex characters.
    pub fn generate_invite_code() -> String {
        Uuid::new_v4().simple().to_string()[..8].to_uppercase()
    }

    /// Create a pending couple for `created_by`, rejecting profiles that are
    /// already in one.
    pub async fn create(
        pool: &SqlitePool,
        created_by: Uuid,
        couple_id: Uuid,
    ) -> Result<Self, CoupleError> {
        if Self::find_for_profile(pool, created_by).await?.is_some() {
            return Err(CoupleError::AlreadyPaired);
        }

        let invite_code = Self::generate_invite_code();
        Ok(sqlx::query_as::<_, Couple>(
            r#"INSERT INTO couples (id, invite_code, created_by)
               VALUES ($1, $2, $3)
               RETURNING id, invite_code, created_by, partner_id, created_at, updated_at"#,
        )
        .bind(couple_id)
        .bind(&invite_code)
        .bind(created_by)
        .fetch_one(pool)
        .await?)
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Couple>(
            r#"SELECT id, invite_code, created_by, partner_id, created_at, updated_at
               FROM couples
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// The couple a profile belongs to, on either side of the pairing.
    pub async fn find_for_profile(
        pool: &SqlitePool,
        profile_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Couple>(
            r#"SELECT id, invite_code, created_by, partner_id, created_at, updated_at
               FROM couples
               WHERE created_by = $1 OR partner_id = $1"#,
        )
        .bind(profile_id)
        .fetch_optional(pool)
        .await
    }

    /// All couples with both partners present. Pending couples have nobody to
    /// notify on the other side, so the notifier loops skip them.
    pub async fn find_all_paired(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Couple>(
            r#"SELECT id, invite_code, created_by, partner_id, created_at, updated_at
               FROM couples
               WHERE partner_id IS NOT NULL
               ORDER BY created_at"#,
        )
        .fetch_all(pool)
        .await
    }

    /// Redeem an invite code. Joining your own couple is covered by the
    /// already-paired check; the guarded UPDATE (`partner_id IS NULL`) is the
    /// linearization point, so two concurrent joins cannot both succeed.
    pub async fn join(
        pool: &SqlitePool,
        invite_code: &str,
        profile_id: Uuid,
    ) -> Result<Self, CoupleError> {
        if Self::find_for_profile(pool, profile_id).await?.is_some() {
            return Err(CoupleError::AlreadyPaired);
        }

        let couple = sqlx::query_as::<_, Couple>(
            r#"SELECT id, invite_code, created_by, partner_id, created_at, updated_at
               FROM couples
               WHERE invite_code = $1"#,
        )
        .bind(invite_code)
        .fetch_optional(pool)
        .await?
        .ok_or(CoupleError::InviteCodeInvalid)?;

        let updated = sqlx::query_as::<_, Couple>(
            r#"UPDATE couples
               SET partner_id = $2,
                   updated_at = datetime('now', 'subsec')
               WHERE id = $1 AND partner_id IS NULL
               RETURNING id, invite_code, created_by, partner_id, created_at, updated_at"#,
        )
        .bind(couple.id)
        .bind(profile_id)
        .fetch_optional(pool)
        .await?;

        updated.ok_or(CoupleError::InviteCodeInvalid)
    }

    /// Both member profile ids; one entry while the couple is pending.
    pub fn members(&self) -> Vec<Uuid> {
        match self.partner_id {
            Some(partner) => vec![self.created_by, partner],
            None => vec![self.created_by],
        }
    }

    /// The other member of the couple, if `profile_id` is a member and a
    /// partner exists.
    pub fn partner_of(&self, profile_id: Uuid) -> Option<Uuid> {
        if profile_id == self.created_by {
            self.partner_id
        } else if self.partner_id == Some(profile_id) {
            Some(self.created_by)
        } else {
            None
        }
    }
}
