use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::Response,
};
use redis::aio::MultiplexedConnection;

use crate::{config::Config, error::AppError, extractors::client_ip};

/// Fixed-window request counter per client IP and path, kept in redis.
///
/// One multiplexed connection is opened at startup and shared by all requests.
#[derive(Clone)]
pub struct RateLimiter {
    conn: MultiplexedConnection,
    window_secs: u64,
    max_requests: u32,
}

impl RateLimiter {
    pub fn new(conn: MultiplexedConnection, window_secs: u64, max_requests: u32) -> Self {
        Self {
            conn,
            window_secs,
            max_requests,
        }
    }

    /// Connects a limiter when `REDIS_URL` is configured.
    pub async fn from_config(config: &Config) -> Result<Option<Self>, redis::RedisError> {
        let Some(url) = &config.redis_url else {
            return Ok(None);
        };

        let conn = redis::Client::open(url.as_str())?
            .get_multiplexed_async_connection()
            .await?;
        Ok(Some(Self::new(
            conn,
            config.rate_limit_window().as_secs(),
            config.rate_limit_requests,
        )))
    }

    pub fn key(ip: &str, path: &str) -> String {
        format!("rate_limit:{}:{}", path, ip)
    }

    /// Counts one request and reports whether it is still within the window budget.
    pub async fn hit(&self, key: &str) -> Result<bool, redis::RedisError> {
        let mut conn = self.conn.clone();

        // MULTI: `SET NX EX` opens the window together with its expiry, INCR keeps the TTL.
        let (count,): (u64,) = redis::pipe()
            .atomic()
            .cmd("SET")
            .arg(key)
            .arg(0)
            .arg("NX")
            .arg("EX")
            .arg(self.window_secs)
            .ignore()
            .incr(key, 1)
            .query_async(&mut conn)
            .await?;

        Ok(count <= self.max_requests as u64)
    }
}

pub async fn rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let ip = client_ip(
        req.headers(),
        req.extensions().get::<ConnectInfo<SocketAddr>>(),
    );
    let key = RateLimiter::key(&ip, req.uri().path());

    let allowed = limiter.hit(&key).await.map_err(|e| {
        AppError::ServerError(format!("rate limiter unavailable: {}", e))
    })?;

    if !allowed {
        tracing::warn!("Rate limit exceeded for {}", key);
        return Err(AppError::TooManyRequests(limiter.window_secs));
    }

    Ok(next.run(req).await)
}
