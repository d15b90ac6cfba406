//! services/api/src/web/currently_reading.rs
//!
//! Currently-reading shelf endpoints. These are the flows that feed the
//! reading log with started, progress, finished and removed entries.

use crate::web::rest::{into_http_error, HandlerError};
use crate::web::state::AppState;
use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use reading_tracker_core::{CurrentlyReadingItem, ProgressUpdate, ReadItem, StartReading};
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/currently-reading",
    responses(
        (status = 200, description = "Books on the currently-reading shelf",
            body = [CurrentlyReadingItem])
    ),
    params(
        ("x-user-id" = Uuid, Header,
            description = "Caller's user id. The header name follows IDENTITY_HEADER.")
    )
)]
pub async fn list_currently_reading_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<Vec<CurrentlyReadingItem>>, HandlerError> {
    let items = app_state
        .currently_reading
        .list(user_id)
        .await
        .map_err(into_http_error)?;
    Ok(Json(items))
}

#[utoipa::path(
    post,
    path = "/currently-reading",
    request_body = StartReading,
    responses(
        (status = 201, description = "Book added to the shelf", body = CurrentlyReadingItem),
        (status = 400, description = "Invalid book or already being read")
    ),
    params(
        ("x-user-id" = Uuid, Header,
            description = "Caller's user id. The header name follows IDENTITY_HEADER.")
    )
)]
pub async fn start_reading_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(params): Json<StartReading>,
) -> Result<impl IntoResponse, HandlerError> {
    let item = app_state
        .currently_reading
        .start(user_id, params)
        .await
        .map_err(into_http_error)?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Move the bookmark; the page delta is logged.
#[utoipa::path(
    put,
    path = "/currently-reading/{book_id}",
    request_body = ProgressUpdate,
    responses(
        (status = 200, description = "Progress recorded", body = CurrentlyReadingItem),
        (status = 400, description = "Page out of range"),
        (status = 404, description = "Book is not on the shelf")
    ),
    params(
        ("book_id" = String, Path, description = "Catalog id of the book."),
        ("x-user-id" = Uuid, Header,
            description = "Caller's user id. The header name follows IDENTITY_HEADER.")
    )
)]
pub async fn update_progress_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(book_id): Path<String>,
    Json(update): Json<ProgressUpdate>,
) -> Result<Json<CurrentlyReadingItem>, HandlerError> {
    let item = app_state
        .currently_reading
        .update_progress(user_id, &book_id, update)
        .await
        .map_err(into_http_error)?;
    Ok(Json(item))
}

#[utoipa::path(
    post,
    path = "/currently-reading/{book_id}/finish",
    responses(
        (status = 200, description = "Book moved to the read shelf", body = ReadItem),
        (status = 404, description = "Book is not on the shelf")
    ),
    params(
        ("book_id" = String, Path, description = "Catalog id of the book."),
        ("x-user-id" = Uuid, Header,
            description = "Caller's user id. The header name follows IDENTITY_HEADER.")
    )
)]
pub async fn finish_reading_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(book_id): Path<String>,
) -> Result<Json<ReadItem>, HandlerError> {
    let read = app_state
        .currently_reading
        .finish(user_id, &book_id)
        .await
        .map_err(into_http_error)?;
    Ok(Json(read))
}

#[utoipa::path(
    delete,
    path = "/currently-reading/{book_id}",
    responses(
        (status = 204, description = "Book removed without finishing it"),
        (status = 404, description = "Book is not on the shelf")
    ),
    params(
        ("book_id" = String, Path, description = "Catalog id of the book."),
        ("x-user-id" = Uuid, Header,
            description = "Caller's user id. The header name follows IDENTITY_HEADER.")
    )
)]
pub async fn remove_currently_reading_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(book_id): Path<String>,
) -> Result<StatusCode, HandlerError> {
    app_state
        .currently_reading
        .remove(user_id, &book_id)
        .await
        .map_err(into_http_error)?;
    Ok(StatusCode::NO_CONTENT)
}
