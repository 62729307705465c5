use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, patch, post, put},
};
use tower_http::trace::TraceLayer;

use crate::{
    AppState,
    auth::Role,
    error::AppError,
    middleware::{RoleGuard, auth_middleware, log_errors, rate_limit},
    routes::{address, admin, user},
};

/// Unauthenticated endpoints; rate limited when a limiter is configured.
fn public_routes(state: &AppState) -> Router<AppState> {
    let router = Router::new()
        .route("/register", post(user::register))
        .route("/login", post(user::login))
        .route("/refresh", post(user::refresh));

    match &state.rate_limiter {
        Some(limiter) => router.route_layer(from_fn_with_state(limiter.clone(), rate_limit)),
        None => router,
    }
}

fn user_routes(state: &AppState) -> Router<AppState> {
    let guard = RoleGuard::require(state.tokens().clone(), Role::User);

    Router::new()
        .route("/user/logout", post(user::logout))
        .route("/user/session", get(user::session))
        .route(
            "/user/{book}",
            post(address::add_address).get(address::list_addresses),
        )
        .route(
            "/user/{book}/{id}",
            get(address::get_address)
                .put(address::update_address)
                .delete(address::delete_address),
        )
        .route(
            "/user/{book}/{id}/default",
            patch(address::set_default_address),
        )
        .route_layer(from_fn_with_state(guard, auth_middleware))
}

fn admin_routes(state: &AppState) -> Router<AppState> {
    let guard = RoleGuard::require(state.tokens().clone(), Role::Admin);

    Router::new()
        .route(
            "/admin/users",
            post(admin::create_user).get(admin::list_users),
        )
        .route(
            "/admin/users/{id}",
            get(admin::get_user)
                .put(admin::update_user)
                .delete(admin::delete_user),
        )
        .route("/admin/{book}", post(admin::create_address))
        .route("/admin/{book}/{id}", put(admin::update_address))
        .route_layer(from_fn_with_state(guard, auth_middleware))
}

async fn not_found() -> AppError {
    AppError::NotFound("Route not found".into())
}

async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(public_routes(&state))
        .merge(user_routes(&state))
        .merge(admin_routes(&state))
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(from_fn(log_errors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
