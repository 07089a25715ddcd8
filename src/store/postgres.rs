use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{NewUser, User};
use crate::store::IdentityStore;

const USER_COLUMNS: &str =
    "id, username, email, full_name, password_hash, refresh_token, created_at";

/// Identity store backed by Postgres.
///
/// The `users` table mirrors [`User`]: uuid primary key, unique lowercased
/// `username` and `email`, nullable `refresh_token` holding the single active
/// session slot.
pub struct PgIdentityStore {
    pool: PgPool,
}

impl PgIdentityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityStore for PgIdentityStore {
    async fn create(&self, new_user: NewUser) -> Result<User, AppError> {
        let sql = format!(
            "INSERT INTO users (id, username, email, full_name, password_hash) \
             VALUES ($1, LOWER($2), LOWER($3), $4, $5) \
             RETURNING {USER_COLUMNS}"
        );
        // A unique violation here maps to Conflict via From<sqlx::Error>,
        // covering the race between the duplicate pre-check and the insert.
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(&new_user.username)
            .bind(&new_user.email)
            .bind(&new_user.full_name)
            .bind(&new_user.password_hash)
            .fetch_one(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_username_or_email(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<User>, AppError> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE ($1::text IS NOT NULL AND username = LOWER($1)) \
                OR ($2::text IS NOT NULL AND email = LOWER($2))"
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn set_refresh_token(&self, id: Uuid, token: &str) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE users SET refresh_token = $1 WHERE id = $2")
            .bind(token)
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".into()));
        }
        Ok(())
    }

    async fn swap_refresh_token(
        &self,
        id: Uuid,
        current: &str,
        new: &str,
    ) -> Result<bool, AppError> {
        // Single conditional UPDATE: the compare and the overwrite happen in
        // one statement, so two concurrent rotations of the same token cannot
        // both succeed.
        let result = sqlx::query(
            "UPDATE users SET refresh_token = $1 WHERE id = $2 AND refresh_token = $3",
        )
        .bind(new)
        .bind(id)
        .bind(current)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn clear_refresh_token(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET refresh_token = NULL WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
