//! services/api/src/web/challenges.rs
//!
//! Reading challenge endpoints.

use crate::web::rest::{into_http_error, HandlerError};
use crate::web::state::AppState;
use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use reading_tracker_core::{ChallengeChanges, NewChallenge, ReadingChallenge};
use std::sync::Arc;
use uuid::Uuid;

/// List the caller's challenges with up-to-date progress.
#[utoipa::path(
    get,
    path = "/challenges",
    responses(
        (status = 200, description = "All challenges of the caller", body = [ReadingChallenge]),
        (status = 401, description = "Missing or invalid identity header")
    ),
    params(
        ("x-user-id" = Uuid, Header,
            description = "Caller's user id. The header name follows IDENTITY_HEADER.")
    )
)]
pub async fn list_challenges_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<Vec<ReadingChallenge>>, HandlerError> {
    let challenges = app_state
        .challenges
        .list_challenges(user_id)
        .await
        .map_err(into_http_error)?;
    Ok(Json(challenges))
}

/// Create a challenge.
///
/// A challenge whose start date is already past starts with the progress the
/// reading log already shows.
#[utoipa::path(
    post,
    path = "/challenges",
    request_body = NewChallenge,
    responses(
        (status = 201, description = "Challenge created", body = ReadingChallenge),
        (status = 400, description = "Non-positive target, empty name or end not after start"),
        (status = 401, description = "Missing or invalid identity header"),
        (status = 409, description = "Concurrent profile update, retry")
    ),
    params(
        ("x-user-id" = Uuid, Header,
            description = "Caller's user id. The header name follows IDENTITY_HEADER.")
    )
)]
pub async fn create_challenge_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(params): Json<NewChallenge>,
) -> Result<impl IntoResponse, HandlerError> {
    let challenge = app_state
        .challenges
        .create_challenge(user_id, params)
        .await
        .map_err(into_http_error)?;
    Ok((StatusCode::CREATED, Json(challenge)))
}

/// Change a challenge's name, target, end date, type or timeframe.
#[utoipa::path(
    put,
    path = "/challenges/{id}",
    request_body = ChallengeChanges,
    responses(
        (status = 200, description = "Challenge updated and recomputed", body = ReadingChallenge),
        (status = 400, description = "The changed challenge is invalid"),
        (status = 404, description = "No such challenge")
    ),
    params(
        ("id" = Uuid, Path, description = "Challenge id."),
        ("x-user-id" = Uuid, Header,
            description = "Caller's user id. The header name follows IDENTITY_HEADER.")
    )
)]
pub async fn update_challenge_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(challenge_id): Path<Uuid>,
    Json(changes): Json<ChallengeChanges>,
) -> Result<Json<ReadingChallenge>, HandlerError> {
    let challenge = app_state
        .challenges
        .update_challenge(user_id, challenge_id, changes)
        .await
        .map_err(into_http_error)?;
    Ok(Json(challenge))
}

#[utoipa::path(
    delete,
    path = "/challenges/{id}",
    responses(
        (status = 204, description = "Challenge deleted"),
        (status = 404, description = "No such challenge")
    ),
    params(
        ("id" = Uuid, Path, description = "Challenge id."),
        ("x-user-id" = Uuid, Header,
            description = "Caller's user id. The header name follows IDENTITY_HEADER.")
    )
)]
pub async fn delete_challenge_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(challenge_id): Path<Uuid>,
) -> Result<StatusCode, HandlerError> {
    app_state
        .challenges
        .delete_challenge(user_id, challenge_id)
        .await
        .map_err(into_http_error)?;
    Ok(StatusCode::NO_CONTENT)
}
