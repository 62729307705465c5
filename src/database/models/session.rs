use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Login audit row. Informational only, never used for authorization.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct LoginSession {
    pub id: i64,
    pub user_id: i64,
    pub browser: String,
    pub os: String,
    pub device: String,
    pub ip_address: String,
    pub login_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewLoginSession {
    pub user_id: i64,
    pub browser: String,
    pub os: String,
    pub device: String,
    pub ip_address: String,
}
