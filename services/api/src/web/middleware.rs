//! services/api/src/web/middleware.rs
//!
//! Identity middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::web::state::AppState;

/// Middleware that resolves the caller's user id.
///
/// Authentication happens upstream: the identity provider's gateway verifies
/// the token and forwards the subject in the configured header. The id is
/// inserted into request extensions for handlers to use. If it is missing or
/// not a UUID, returns 401 Unauthorized.
pub async fn require_identity(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let header_name = state.config.identity_header.as_str();

    // 1. Extract the identity header
    let raw = req
        .headers()
        .get(header_name)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            warn!(header = header_name, "Request without identity header");
            StatusCode::UNAUTHORIZED
        })?;

    // 2. Parse the subject
    let user_id = Uuid::parse_str(raw.trim()).map_err(|_| {
        warn!(header = header_name, "Identity header is not a valid user id");
        StatusCode::UNAUTHORIZED
    })?;

    // 3. Insert user_id into request extensions
    req.extensions_mut().insert(user_id);

    // 4. Continue to the handler
    Ok(next.run(req).await)
}
