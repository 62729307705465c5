use axum::extract::{Extension, Json, State};

use crate::{
    AppState,
    auth::Claims,
    database::{AddressBook, AddressFields, AddressRepository, StoreError},
    error::AppError,
    extractors::{AppPath, ValidatedJson},
};

use super::model::{
    AddressCreatedResponse, AddressInput, AddressListResponse, AddressMessageResponse,
    AddressResponse,
};

/// Maps a missing row to the book's own "not found" message.
pub(crate) fn book_error(book: AddressBook) -> impl FnOnce(StoreError) -> AppError {
    move |err| match err {
        StoreError::NotFound => AppError::NotFound(format!("{} not found", book.label())),
        other => other.into(),
    }
}

pub async fn add_address(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppPath(book): AppPath<AddressBook>,
    ValidatedJson(input): ValidatedJson<AddressInput>,
) -> Result<Json<AddressCreatedResponse>, AppError> {
    let address_type = input.address_type;
    let fields = AddressFields::from(input);

    let added = AddressRepository::new(state.pool.clone())
        .add(claims.user_id, book, &fields)
        .await?;

    Ok(Json(AddressCreatedResponse {
        message: format!("{} added", book.label()),
        address_id: added.id,
        is_default: added.is_default,
        address_type,
    }))
}

pub async fn list_addresses(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppPath(book): AppPath<AddressBook>,
) -> Result<Json<AddressListResponse>, AppError> {
    let addresses = AddressRepository::new(state.pool.clone())
        .list(claims.user_id, book)
        .await?;

    Ok(Json(AddressListResponse {
        message: format!("{} list", book.label()),
        addresses,
    }))
}

pub async fn get_address(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppPath((book, address_id)): AppPath<(AddressBook, i64)>,
) -> Result<Json<AddressResponse>, AppError> {
    let address = AddressRepository::new(state.pool.clone())
        .find(claims.user_id, book, address_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} not found", book.label())))?;

    Ok(Json(AddressResponse { address }))
}

pub async fn update_address(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppPath((book, address_id)): AppPath<(AddressBook, i64)>,
    ValidatedJson(input): ValidatedJson<AddressInput>,
) -> Result<Json<AddressMessageResponse>, AppError> {
    AddressRepository::new(state.pool.clone())
        .update(Some(claims.user_id), book, address_id, &input.into())
        .await
        .map_err(book_error(book))?;

    Ok(Json(AddressMessageResponse {
        message: format!("{} updated", book.label()),
        address_id,
    }))
}

pub async fn delete_address(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppPath((book, address_id)): AppPath<(AddressBook, i64)>,
) -> Result<Json<AddressMessageResponse>, AppError> {
    AddressRepository::new(state.pool.clone())
        .delete(claims.user_id, book, address_id)
        .await
        .map_err(book_error(book))?;

    Ok(Json(AddressMessageResponse {
        message: format!("{} deleted", book.label()),
        address_id,
    }))
}

pub async fn set_default_address(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppPath((book, address_id)): AppPath<(AddressBook, i64)>,
) -> Result<Json<AddressMessageResponse>, AppError> {
    AddressRepository::new(state.pool.clone())
        .set_default(claims.user_id, book, address_id)
        .await
        .map_err(book_error(book))?;

    Ok(Json(AddressMessageResponse {
        message: format!("{} set as default", book.label()),
        address_id,
    }))
}
