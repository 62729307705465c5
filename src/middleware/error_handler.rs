use axum::{body::Body, http::Request, middleware::Next, response::Response};
use tracing::error;

use crate::error::ServerErrorDetail;

/// Logs every 5xx response once, with the request line and the internal detail.
pub async fn log_errors(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let response = next.run(req).await;

    if !response.status().is_server_error() {
        return response;
    }

    match response.extensions().get::<ServerErrorDetail>() {
        Some(ServerErrorDetail(detail)) => error!(
            "Server error on {} {} - Status: {}, Detail: {}",
            method,
            uri,
            response.status(),
            detail
        ),
        None => error!(
            "Server error on {} {} - Status: {}",
            method,
            uri,
            response.status()
        ),
    }

    response
}
