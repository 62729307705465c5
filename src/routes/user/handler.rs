use axum::extract::{Extension, Json, State};

use crate::{
    AppState,
    auth::{Claims, Registration},
    database::{AddressBook, AddressRepository, CredentialStore, SessionRepository, UserRepository},
    error::AppError,
    extractors::{ClientMeta, ValidatedJson},
};

use super::model::{
    LoginRequest, LoginResponse, MessageResponse, RefreshRequest, RefreshResponse,
    RegisterResponse, SessionResponse,
};

pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<Registration>,
) -> Result<Json<RegisterResponse>, AppError> {
    let (user_id, role) = state.auth.register(req).await?;

    Ok(Json(RegisterResponse {
        message: "User created successfully".into(),
        user_id,
        role,
    }))
}

pub async fn login(
    State(state): State<AppState>,
    ClientMeta(client): ClientMeta,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let tokens = state
        .auth
        .login(&req.identifier, &req.password, client)
        .await?;

    Ok(Json(LoginResponse {
        message: "Login successful".into(),
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        role: tokens.role,
    }))
}

pub async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RefreshRequest>,
) -> Result<Json<RefreshResponse>, AppError> {
    let refreshed = state.auth.refresh(&req.refresh_token).await?;

    Ok(Json(RefreshResponse {
        message: "Token refreshed".into(),
        access_token: refreshed.access_token,
        role: refreshed.role,
    }))
}

/// Removes the caller's login sessions; issued tokens stay valid until expiry.
pub async fn logout(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<MessageResponse>, AppError> {
    state.auth.logout(claims.user_id).await?;

    Ok(Json(MessageResponse {
        message: "Logged out successfully".into(),
    }))
}

pub async fn session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<SessionResponse>, AppError> {
    let user = UserRepository::new(state.pool.clone())
        .find_user_by_id(claims.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let addresses = AddressRepository::new(state.pool.clone());
    let general = addresses.list(user.id, AddressBook::General).await?;
    let shipping = addresses.list(user.id, AddressBook::Shipping).await?;
    let billing = addresses.list(user.id, AddressBook::Billing).await?;
    let login_sessions = SessionRepository::new(state.pool.clone())
        .list_for_user(user.id)
        .await?;

    Ok(Json(SessionResponse {
        user,
        addresses: general,
        shipping_addresses: shipping,
        billing_addresses: billing,
        login_sessions,
    }))
}
