// Database module
// Row models, the credential store seam and the Postgres repositories.

pub mod models;
pub mod repositories;
pub mod store;

pub use models::address::{Address, AddressBook, AddressFields, AddressType};
pub use models::session::{LoginSession, NewLoginSession};
pub use models::user::{NewUser, User, UserUpdate};
pub use repositories::address::AddressRepository;
pub use repositories::session::SessionRepository;
pub use repositories::user::UserRepository;
pub use store::CredentialStore;

/// Storage failure as seen by the rest of the crate.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unique constraint violated on {column}")]
    ConstraintViolation { column: String },
    #[error("row not found")]
    NotFound,
    #[error("stored row is invalid: {0}")]
    Corrupt(String),
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                if let Some(column) = db_err.constraint().and_then(user_constraint_column) {
                    return StoreError::ConstraintViolation { column };
                }
            }
        }
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            other => StoreError::Database(other),
        }
    }
}

/// Maps a `users` unique constraint (`users_email_key`) to its column.
///
/// Other constraints, like the one-default indexes of the address books,
/// return `None` and stay plain database errors.
pub fn user_constraint_column(constraint: &str) -> Option<String> {
    constraint
        .strip_prefix("users_")
        .and_then(|rest| rest.strip_suffix("_key"))
        .filter(|column| !column.is_empty())
        .map(str::to_string)
}
