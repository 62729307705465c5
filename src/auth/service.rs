//! Registration, login, token refresh and logout.

use std::sync::Arc;

use serde::Deserialize;
use validator::Validate;

use super::{Role, TokenCodec, TokenKind};
use crate::database::{CredentialStore, NewLoginSession, NewUser};
use crate::error::AppError;
use crate::utils::{hash_password_with_cost, parse_user_agent, verify_password};

/// Self-service registration input.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Registration {
    #[validate(length(min = 3, message = "Username must be at least 3 characters"))]
    pub username: String,
    #[validate(email(message = "Email is invalid"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    pub phone_number: Option<String>,
    pub image: Option<String>,
}

/// Where a login came from, recorded in the session audit row.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub user_agent: Option<String>,
    pub ip_address: String,
}

#[derive(Debug, Clone)]
pub struct LoginTokens {
    pub user_id: i64,
    pub access_token: String,
    pub refresh_token: String,
    pub role: Role,
}

#[derive(Debug, Clone)]
pub struct RefreshedToken {
    pub access_token: String,
    pub role: Role,
}

pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    tokens: TokenCodec,
    hash_cost: u32,
}

impl AuthService {
    pub fn new(store: Arc<dyn CredentialStore>, tokens: TokenCodec) -> Self {
        Self {
            store,
            tokens,
            hash_cost: bcrypt::DEFAULT_COST,
        }
    }

    /// Overrides the bcrypt cost. Only meant for tests.
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    pub fn tokens(&self) -> &TokenCodec {
        &self.tokens
    }

    pub fn hash_cost(&self) -> u32 {
        self.hash_cost
    }

    /// Creates a `user` account and returns its id and role.
    pub async fn register(&self, registration: Registration) -> Result<(i64, Role), AppError> {
        registration.validate()?;

        let password_hash = hash_password_with_cost(&registration.password, self.hash_cost)?;
        let user = self
            .store
            .create_user(NewUser {
                username: registration.username,
                email: registration.email,
                password_hash,
                role: Role::User,
                phone_number: registration.phone_number,
                image: registration.image,
                is_verified: false,
                is_blocked: false,
            })
            .await?;

        tracing::info!("Registered user {} ({})", user.id, user.username);
        Ok((user.id, user.role))
    }

    /// Authenticates by username or email and issues an access/refresh pair.
    ///
    /// Unknown identifiers and wrong passwords fail identically. A blocked
    /// account is only reported after the password matched.
    pub async fn login(
        &self,
        identifier: &str,
        password: &str,
        client: ClientInfo,
    ) -> Result<LoginTokens, AppError> {
        let Some(user) = self.store.find_user_by_identifier(identifier).await? else {
            return Err(AppError::InvalidCredentials);
        };

        match verify_password(password, &user.password_hash) {
            Ok(true) => {}
            Ok(false) => return Err(AppError::InvalidCredentials),
            Err(e) => {
                tracing::warn!("Unverifiable password hash for user {}: {}", user.id, e);
                return Err(AppError::InvalidCredentials);
            }
        }

        if user.is_blocked {
            tracing::warn!("Blocked user {} attempted to log in", user.id);
            return Err(AppError::Forbidden("Account is blocked".into()));
        }

        let access_token = self.tokens.issue(TokenKind::Access, user.subject())?;
        let refresh_token = self.tokens.issue(TokenKind::Refresh, user.subject())?;

        self.record_session(user.id, client).await;
        tracing::info!("User {} logged in", user.id);

        Ok(LoginTokens {
            user_id: user.id,
            access_token,
            refresh_token,
            role: user.role,
        })
    }

    /// Best-effort audit write: errors are logged and never fail the login.
    async fn record_session(&self, user_id: i64, client: ClientInfo) {
        let agent = parse_user_agent(client.user_agent.as_deref());
        let session = NewLoginSession {
            user_id,
            browser: agent.browser,
            os: agent.os,
            device: agent.device,
            ip_address: client.ip_address,
        };

        if let Err(e) = self.store.record_login_session(session).await {
            tracing::warn!("Failed to record login session for user {}: {}", user_id, e);
        }
    }

    /// Exchanges a refresh token for a new access token.
    ///
    /// The user is re-read so the new token carries the current role, email
    /// and username. The refresh token itself is not rotated.
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshedToken, AppError> {
        let claims = self
            .tokens
            .verify_kind(refresh_token, TokenKind::Refresh)
            .map_err(|e| {
                tracing::debug!("Rejected refresh token: {}", e);
                AppError::Unauthorized("Invalid or expired refresh token".into())
            })?;

        let user = self
            .store
            .find_user_by_id(claims.user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("User no longer exists".into()))?;

        let access_token = self.tokens.issue(TokenKind::Access, user.subject())?;
        Ok(RefreshedToken {
            access_token,
            role: user.role,
        })
    }

    /// Deletes the user's login sessions.
    ///
    /// Tokens are stateless: an access token issued before logout stays
    /// valid until it expires.
    pub async fn logout(&self, user_id: i64) -> Result<u64, AppError> {
        let removed = self.store.delete_login_sessions(user_id).await?;
        tracing::info!("User {} logged out, removed {} sessions", user_id, removed);
        Ok(removed)
    }
}
