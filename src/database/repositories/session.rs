use sqlx::PgPool;

use crate::database::{LoginSession, NewLoginSession, StoreError};

/// Login audit rows
pub struct SessionRepository {
    db: PgPool,
}

impl SessionRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn insert(&self, session: NewLoginSession) -> Result<i64, StoreError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO login_sessions (user_id, browser, os, device, ip_address, login_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            RETURNING id
            "#,
        )
        .bind(session.user_id)
        .bind(&session.browser)
        .bind(&session.os)
        .bind(&session.device)
        .bind(&session.ip_address)
        .fetch_one(&self.db)
        .await?;

        Ok(id)
    }

    /// Newest first
    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<LoginSession>, StoreError> {
        let sessions = sqlx::query_as::<_, LoginSession>(
            r#"
            SELECT id, user_id, browser, os, device, ip_address, login_at
            FROM login_sessions
            WHERE user_id = $1
            ORDER BY login_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(sessions)
    }

    pub async fn delete_for_user(&self, user_id: i64) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM login_sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected())
    }
}
