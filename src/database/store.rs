use async_trait::async_trait;

use super::{NewLoginSession, NewUser, StoreError, User};

/// Persistence needed by the auth service.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fails with `StoreError::ConstraintViolation` naming the collided column.
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;

    /// Looks the identifier up as a username first, then as an email.
    async fn find_user_by_identifier(&self, identifier: &str)
    -> Result<Option<User>, StoreError>;

    async fn find_user_by_id(&self, user_id: i64) -> Result<Option<User>, StoreError>;

    async fn record_login_session(&self, session: NewLoginSession) -> Result<i64, StoreError>;

    /// Returns the number of deleted sessions.
    async fn delete_login_sessions(&self, user_id: i64) -> Result<u64, StoreError>;
}
