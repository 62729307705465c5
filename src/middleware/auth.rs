use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};

use crate::auth::{Claims, Role, TokenCodec, TokenKind};
use crate::error::AppError;

/// Bearer-token check for a group of routes, optionally pinned to one role.
///
/// Holds only the immutable codec, so a single guard serves every request.
#[derive(Clone, Debug)]
pub struct RoleGuard {
    tokens: TokenCodec,
    required: Option<Role>,
}

impl RoleGuard {
    pub fn new(tokens: TokenCodec, required: Option<Role>) -> Self {
        Self { tokens, required }
    }

    pub fn require(tokens: TokenCodec, role: Role) -> Self {
        Self::new(tokens, Some(role))
    }

    /// Resolves the caller's claims from the `Authorization` header.
    pub fn authorize(&self, headers: &HeaderMap) -> Result<Claims, AppError> {
        if !headers.contains_key(AUTHORIZATION) {
            return Err(AppError::Unauthorized(
                "Authorization header required".into(),
            ));
        }

        let Some(Authorization(bearer)) = headers.typed_get::<Authorization<Bearer>>() else {
            return Err(AppError::Unauthorized(
                "Invalid authorization format".into(),
            ));
        };

        let claims = self
            .tokens
            .verify_kind(bearer.token(), TokenKind::Access)
            .map_err(|e| {
                tracing::debug!("Rejected bearer token: {}", e);
                AppError::Unauthorized("Invalid or expired token".into())
            })?;

        if let Some(required) = self.required {
            if claims.role != required {
                tracing::warn!(
                    "User {} with role {} denied access requiring {}",
                    claims.user_id,
                    claims.role,
                    required
                );
                return Err(AppError::Forbidden("Insufficient permissions".into()));
            }
        }

        Ok(claims)
    }
}

/// Verifies the bearer token and exposes its [`Claims`] as a request extension.
pub async fn auth_middleware(
    State(guard): State<RoleGuard>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let claims = guard.authorize(request.headers())?;
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
