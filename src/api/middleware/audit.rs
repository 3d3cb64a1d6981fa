//! Audit logging middleware.
//!
//! Logs every authenticated request with username, method, path and
//! response status. Runs innermost (after auth has injected UserContext).

use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::api::types::UserContext;

pub async fn log_access(req: Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let username = req
        .extensions()
        .get::<UserContext>()
        .map(|u| u.username.clone())
        .unwrap_or_else(|| "anonymous".into());

    let response = next.run(req).await;

    tracing::info!(
        user = %username,
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        "API access"
    );

    response
}
