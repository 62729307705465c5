use std::sync::Arc;

use sqlx::PgPool;

pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod utils;

use auth::{AuthService, TokenCodec};
use config::Config;
use database::{CredentialStore, UserRepository};
use middleware::RateLimiter;

pub use router::create_router;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub auth: Arc<AuthService>,
    pub rate_limiter: Option<Arc<RateLimiter>>,
}

impl AppState {
    /// State backed by the Postgres user repository.
    pub fn new(pool: PgPool, config: Config) -> Result<Self, auth::TokenError> {
        let store = Arc::new(UserRepository::new(pool.clone()));
        Self::with_store(pool, config, store)
    }

    /// State whose auth service uses the given credential store.
    pub fn with_store(
        pool: PgPool,
        config: Config,
        store: Arc<dyn CredentialStore>,
    ) -> Result<Self, auth::TokenError> {
        let tokens = TokenCodec::new(config.jwt_secret.as_bytes())?;

        Ok(Self {
            pool,
            config,
            auth: Arc::new(AuthService::new(store, tokens)),
            rate_limiter: None,
        })
    }

    pub fn with_auth(mut self, auth: AuthService) -> Self {
        self.auth = Arc::new(auth);
        self
    }

    pub fn with_rate_limiter(mut self, limiter: RateLimiter) -> Self {
        self.rate_limiter = Some(Arc::new(limiter));
        self
    }

    pub fn tokens(&self) -> &TokenCodec {
        self.auth.tokens()
    }
}
