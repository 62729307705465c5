use axum::extract::{Extension, Json, State};

use crate::{
    AppState,
    auth::Claims,
    database::{
        AddressBook, AddressFields, AddressRepository, CredentialStore, NewUser, StoreError,
        UserRepository,
    },
    error::AppError,
    extractors::{AppPath, ValidatedJson},
    routes::address::{AddressInput, book_error},
    utils::hash_password_with_cost,
};

use super::model::{
    AdminAddressInput, AdminAddressResponse, AdminAddressUpdateResponse, AdminUserInput,
    AdminUserUpdateInput, UserIdResponse, UserListResponse, UserResponse,
};

fn user_error(err: StoreError) -> AppError {
    match err {
        StoreError::NotFound => AppError::NotFound("User not found".into()),
        other => other.into(),
    }
}

pub async fn create_user(
    State(state): State<AppState>,
    Extension(admin): Extension<Claims>,
    ValidatedJson(input): ValidatedJson<AdminUserInput>,
) -> Result<Json<UserIdResponse>, AppError> {
    let password_hash = hash_password_with_cost(&input.password, state.auth.hash_cost())?;

    let user = UserRepository::new(state.pool.clone())
        .create_user(NewUser {
            username: input.username,
            email: input.email,
            password_hash,
            role: input.role,
            phone_number: input.phone_number,
            image: input.image,
            is_verified: input.is_verified,
            is_blocked: input.is_blocked,
        })
        .await?;

    tracing::info!(
        "Admin {} created user {} with role {}",
        admin.user_id,
        user.id,
        user.role
    );
    Ok(Json(UserIdResponse {
        message: "User created".into(),
        user_id: user.id,
    }))
}

pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<UserListResponse>, AppError> {
    let users = UserRepository::new(state.pool.clone()).list().await?;

    Ok(Json(UserListResponse {
        message: "User list".into(),
        users,
    }))
}

pub async fn get_user(
    State(state): State<AppState>,
    AppPath(user_id): AppPath<i64>,
) -> Result<Json<UserResponse>, AppError> {
    let user = UserRepository::new(state.pool.clone())
        .find_user_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(Json(UserResponse {
        message: "User details".into(),
        user,
    }))
}

pub async fn update_user(
    State(state): State<AppState>,
    AppPath(user_id): AppPath<i64>,
    ValidatedJson(input): ValidatedJson<AdminUserUpdateInput>,
) -> Result<Json<UserIdResponse>, AppError> {
    UserRepository::new(state.pool.clone())
        .update(user_id, input.into())
        .await
        .map_err(user_error)?;

    Ok(Json(UserIdResponse {
        message: "User updated".into(),
        user_id,
    }))
}

/// Deletes the user together with sessions and all address books.
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(admin): Extension<Claims>,
    AppPath(user_id): AppPath<i64>,
) -> Result<Json<UserIdResponse>, AppError> {
    UserRepository::new(state.pool.clone())
        .delete(user_id)
        .await
        .map_err(user_error)?;

    tracing::info!("Admin {} deleted user {}", admin.user_id, user_id);
    Ok(Json(UserIdResponse {
        message: "User deleted".into(),
        user_id,
    }))
}

pub async fn create_address(
    State(state): State<AppState>,
    AppPath(book): AppPath<AddressBook>,
    ValidatedJson(input): ValidatedJson<AdminAddressInput>,
) -> Result<Json<AdminAddressResponse>, AppError> {
    let user_id = input.user_id;
    let address_type = input.address.address_type;
    let fields = AddressFields::from(input.address);

    let added = AddressRepository::new(state.pool.clone())
        .add(user_id, book, &fields)
        .await
        .map_err(user_error)?;

    Ok(Json(AdminAddressResponse {
        message: format!("{} added", book.label()),
        user_id,
        address_id: added.id,
        is_default: added.is_default,
        address_type,
    }))
}

/// Updates any user's address; the default flag is untouched.
pub async fn update_address(
    State(state): State<AppState>,
    AppPath((book, address_id)): AppPath<(AddressBook, i64)>,
    ValidatedJson(input): ValidatedJson<AddressInput>,
) -> Result<Json<AdminAddressUpdateResponse>, AppError> {
    AddressRepository::new(state.pool.clone())
        .update(None, book, address_id, &input.into())
        .await
        .map_err(book_error(book))?;

    Ok(Json(AdminAddressUpdateResponse {
        message: format!("{} updated", book.label()),
        address_id,
    }))
}
