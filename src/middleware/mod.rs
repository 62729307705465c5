mod auth;
mod error_handler;
mod rate_limit;

pub use auth::{RoleGuard, auth_middleware};
pub use error_handler::log_errors;
pub use rate_limit::{RateLimiter, rate_limit};
