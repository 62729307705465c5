use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::Role;
use crate::database::{Address, LoginSession, User};

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username or email
    #[validate(length(min = 1, message = "Identifier is required"))]
    pub identifier: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user_id: i64,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub access_token: String,
    pub refresh_token: String,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub message: String,
    pub access_token: String,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Profile of the caller with address books and login history.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    #[serde(flatten)]
    pub user: User,
    pub addresses: Vec<Address>,
    pub shipping_addresses: Vec<Address>,
    pub billing_addresses: Vec<Address>,
    pub login_sessions: Vec<LoginSession>,
}
