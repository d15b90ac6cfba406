//! services/api/src/web/reading_log.rs
//!
//! Reading log endpoints.

use crate::web::rest::{into_http_error, HandlerError};
use crate::web::state::AppState;
use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use reading_tracker_core::{LogEntryChanges, NewLogEntry, ReadingLogItem};
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/reading-log",
    responses(
        (status = 200, description = "The caller's reading log", body = [ReadingLogItem])
    ),
    params(
        ("x-user-id" = Uuid, Header,
            description = "Caller's user id. The header name follows IDENTITY_HEADER.")
    )
)]
pub async fn list_reading_log_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<Vec<ReadingLogItem>>, HandlerError> {
    let entries = app_state
        .reading_log
        .list(user_id)
        .await
        .map_err(into_http_error)?;
    Ok(Json(entries))
}

/// Append an entry. `date` defaults to now and `kind` is derived from `notes`
/// when omitted.
#[utoipa::path(
    post,
    path = "/reading-log",
    request_body = NewLogEntry,
    responses(
        (status = 201, description = "Entry created", body = ReadingLogItem),
        (status = 400, description = "Missing book id")
    ),
    params(
        ("x-user-id" = Uuid, Header,
            description = "Caller's user id. The header name follows IDENTITY_HEADER.")
    )
)]
pub async fn create_reading_log_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(params): Json<NewLogEntry>,
) -> Result<impl IntoResponse, HandlerError> {
    let entry = app_state
        .reading_log
        .create(user_id, params)
        .await
        .map_err(into_http_error)?;
    Ok((StatusCode::CREATED, Json(entry)))
}

#[utoipa::path(
    put,
    path = "/reading-log/{id}",
    request_body = LogEntryChanges,
    responses(
        (status = 200, description = "Entry updated", body = ReadingLogItem),
        (status = 404, description = "No such entry")
    ),
    params(
        ("id" = Uuid, Path, description = "Reading log entry id."),
        ("x-user-id" = Uuid, Header,
            description = "Caller's user id. The header name follows IDENTITY_HEADER.")
    )
)]
pub async fn update_reading_log_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(entry_id): Path<Uuid>,
    Json(changes): Json<LogEntryChanges>,
) -> Result<Json<ReadingLogItem>, HandlerError> {
    let entry = app_state
        .reading_log
        .update(user_id, entry_id, changes)
        .await
        .map_err(into_http_error)?;
    Ok(Json(entry))
}

#[utoipa::path(
    delete,
    path = "/reading-log/{id}",
    responses(
        (status = 204, description = "Entry deleted"),
        (status = 404, description = "No such entry")
    ),
    params(
        ("id" = Uuid, Path, description = "Reading log entry id."),
        ("x-user-id" = Uuid, Header,
            description = "Caller's user id. The header name follows IDENTITY_HEADER.")
    )
)]
pub async fn delete_reading_log_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(entry_id): Path<Uuid>,
) -> Result<StatusCode, HandlerError> {
    app_state
        .reading_log
        .delete(user_id, entry_id)
        .await
        .map_err(into_http_error)?;
    Ok(StatusCode::NO_CONTENT)
}
