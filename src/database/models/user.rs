use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::auth::{Role, Subject};
use crate::database::StoreError;

/// Raw `users` row; `role` is still text.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub phone_number: Option<String>,
    pub image: Option<String>,
    pub is_verified: bool,
    pub is_blocked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User account
#[derive(Debug, Clone, Serialize)]
pub struct User {
    /// Server-assigned id
    pub id: i64,
    pub username: String,
    pub email: String,
    /// bcrypt hash, never serialized
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub phone_number: Option<String>,
    pub image: Option<String>,
    pub is_verified: bool,
    /// Blocked accounts cannot log in
    pub is_blocked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn subject(&self) -> Subject<'_> {
        Subject {
            user_id: self.id,
            username: &self.username,
            email: &self.email,
            role: self.role,
        }
    }
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse::<Role>()
            .map_err(|e| StoreError::Corrupt(format!("user {}: {}", row.id, e)))?;

        Ok(User {
            id: row.id,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            role,
            phone_number: row.phone_number,
            image: row.image,
            is_verified: row.is_verified,
            is_blocked: row.is_blocked,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Insert payload; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub phone_number: Option<String>,
    pub image: Option<String>,
    pub is_verified: bool,
    pub is_blocked: bool,
}

/// Admin-side replacement of a user's mutable fields.
#[derive(Debug, Clone)]
pub struct UserUpdate {
    pub username: String,
    pub email: String,
    pub role: Role,
    pub phone_number: Option<String>,
    pub image: Option<String>,
    pub is_verified: bool,
    pub is_blocked: bool,
}
