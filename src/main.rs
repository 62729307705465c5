use std::net::{IpAddr, SocketAddr};

use sqlx::Executor;
use sqlx::postgres::PgPoolOptions;
use storefront_backend::{AppState, config::Config, create_router, middleware::RateLimiter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().expect("Failed to load configuration");

    #[cfg(debug_assertions)]
    tracing::info!("Running in debug mode with CORS enabled");

    #[cfg(not(debug_assertions))]
    tracing::info!("Running in production mode with CORS disabled");

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                conn.execute("SET application_name = 'storefront_backend';")
                    .await?;
                Ok(())
            })
        })
        .connect_with(config.database.clone())
        .await
        .expect("Failed to connect to Postgres");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let mut state =
        AppState::new(pool, config.clone()).expect("Failed to initialise token signing");

    match RateLimiter::from_config(&config)
        .await
        .expect("Failed to connect to Redis")
    {
        Some(limiter) => {
            tracing::info!(
                "Rate limiting auth endpoints to {} requests per {}s",
                config.rate_limit_requests,
                config.rate_limit_window_secs
            );
            state = state.with_rate_limiter(limiter);
        }
        None => tracing::warn!("REDIS_URL not set, rate limiting disabled"),
    }

    let router = create_router(state);

    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding CORS layer for development mode");
        router.layer(tower_http::cors::CorsLayer::permissive())
    };

    let addr = SocketAddr::new(
        config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Failed to start server");
}
