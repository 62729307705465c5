use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::Role;
use crate::database::{AddressType, User, UserUpdate};
use crate::routes::address::AddressInput;

#[derive(Debug, Deserialize, Validate)]
pub struct AdminUserInput {
    #[validate(length(min = 3, message = "Username must be at least 3 characters"))]
    pub username: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[serde(default)]
    pub role: Role,
    pub phone_number: Option<String>,
    pub image: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub is_blocked: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AdminUserUpdateInput {
    #[validate(length(min = 3, message = "Username must be at least 3 characters"))]
    pub username: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    pub role: Role,
    pub phone_number: Option<String>,
    pub image: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub is_blocked: bool,
}

impl From<AdminUserUpdateInput> for UserUpdate {
    fn from(input: AdminUserUpdateInput) -> Self {
        UserUpdate {
            username: input.username,
            email: input.email,
            role: input.role,
            phone_number: input.phone_number,
            image: input.image,
            is_verified: input.is_verified,
            is_blocked: input.is_blocked,
        }
    }
}

/// Address created on behalf of `user_id`.
#[derive(Debug, Deserialize, Validate)]
pub struct AdminAddressInput {
    pub user_id: i64,
    #[serde(flatten)]
    #[validate(nested)]
    pub address: AddressInput,
}

#[derive(Debug, Serialize)]
pub struct UserIdResponse {
    pub message: String,
    pub user_id: i64,
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub message: String,
    pub users: Vec<User>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub message: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct AdminAddressResponse {
    pub message: String,
    pub user_id: i64,
    pub address_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
    #[serde(rename = "type")]
    pub address_type: AddressType,
}

#[derive(Debug, Serialize)]
pub struct AdminAddressUpdateResponse {
    pub message: String,
    pub address_id: i64,
}
