//! User repository for NewsPulse.
//!
//! Minimal profile store: create users and read/write their category
//! preferences.

use super::user::{decode_preferences, encode_preferences, NewUser, User};
use super::DbPool;
use crate::news::Category;
use crate::{NewsPulseError, Result};

/// Repository for user profile operations.
pub struct UserRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository with the given database pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new user in the database.
    pub async fn create(&self, new_user: &NewUser) -> Result<User> {
        let id: i64 = sqlx::query_scalar("INSERT INTO users (email) VALUES (?) RETURNING id")
            .bind(&new_user.email)
            .fetch_one(self.pool)
            .await?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| NewsPulseError::NotFound("user".to_string()))
    }

    /// Get a user by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, preferences, push_subscription, created_at
             FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Get a user's preferred categories.
    ///
    /// Returns None if the user does not exist.
    pub async fn get_preferences(&self, id: i64) -> Result<Option<Vec<Category>>> {
        let raw: Option<String> = sqlx::query_scalar("SELECT preferences FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(raw.map(|raw| decode_preferences(id, &raw)))
    }

    /// Replace a user's preferred categories.
    ///
    /// Returns false if the user does not exist.
    pub async fn set_preferences(&self, id: i64, categories: &[Category]) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET preferences = ? WHERE id = ?")
            .bind(encode_preferences(categories))
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
