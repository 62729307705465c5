use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::models::user::UserRow;
use crate::database::repositories::session::SessionRepository;
use crate::database::{CredentialStore, NewLoginSession, NewUser, StoreError, User, UserUpdate};

/// Postgres-backed user store
#[derive(Clone)]
pub struct UserRepository {
    db: PgPool,
}

impl UserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// All users ordered by id
    pub async fn list(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                id, username, email, password AS password_hash, role,
                phone_number, image, is_verified, is_blocked, created_at, updated_at
            FROM users
            ORDER BY id
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(User::try_from).collect()
    }

    /// Replaces the mutable fields of a user
    pub async fn update(&self, user_id: i64, update: UserUpdate) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET username = $1, email = $2, role = $3, phone_number = $4, image = $5,
                is_verified = $6, is_blocked = $7, updated_at = NOW()
            WHERE id = $8
            "#,
        )
        .bind(&update.username)
        .bind(&update.email)
        .bind(update.role.as_str())
        .bind(&update.phone_number)
        .bind(&update.image)
        .bind(update.is_verified)
        .bind(update.is_blocked)
        .bind(user_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    /// Deletes a user together with its sessions and address books
    pub async fn delete(&self, user_id: i64) -> Result<(), StoreError> {
        let mut tx = self.db.begin().await?;

        for statement in [
            "DELETE FROM login_sessions WHERE user_id = $1",
            "DELETE FROM addresses WHERE user_id = $1",
            "DELETE FROM shipping_addresses WHERE user_id = $1",
            "DELETE FROM billing_addresses WHERE user_id = $1",
        ] {
            sqlx::query(statement).bind(user_id).execute(&mut *tx).await?;
        }

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            // dropping `tx` rolls the cleanup back
            return Err(StoreError::NotFound);
        }

        tx.commit().await?;
        tracing::info!("Deleted user {} and dependent rows", user_id);
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for UserRepository {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (
                username, email, password, role, phone_number, image,
                is_verified, is_blocked, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW(), NOW())
            RETURNING
                id, username, email, password AS password_hash, role,
                phone_number, image, is_verified, is_blocked, created_at, updated_at
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(&user.phone_number)
        .bind(&user.image)
        .bind(user.is_verified)
        .bind(user.is_blocked)
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            let err = StoreError::from(e);
            if !matches!(err, StoreError::ConstraintViolation { .. }) {
                tracing::error!("Failed to create user {}: {:?}", user.username, err);
            }
            err
        })?;

        User::try_from(row)
    }

    async fn find_user_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                id, username, email, password AS password_hash, role,
                phone_number, image, is_verified, is_blocked, created_at, updated_at
            FROM users
            WHERE username = $1 OR email = $1
            ORDER BY (username = $1) DESC
            LIMIT 1
            "#,
        )
        .bind(identifier)
        .fetch_optional(&self.db)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn find_user_by_id(&self, user_id: i64) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                id, username, email, password AS password_hash, role,
                phone_number, image, is_verified, is_blocked, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn record_login_session(&self, session: NewLoginSession) -> Result<i64, StoreError> {
        SessionRepository::new(self.db.clone()).insert(session).await
    }

    async fn delete_login_sessions(&self, user_id: i64) -> Result<u64, StoreError> {
        SessionRepository::new(self.db.clone())
            .delete_for_user(user_id)
            .await
    }
}
