//! services/api/src/web/rest.rs
//!
//! Contains the profile endpoint, the mapping from service errors to HTTP
//! responses and the master definition for the OpenAPI specification.

use crate::web::state::AppState;
use crate::web::{challenges, currently_reading, reading_log};
use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::Json,
};
use reading_tracker_core::{
    Book, BookProgress, ChallengeChanges, ChallengeProgress, ChallengeRate, ChallengeStatus,
    ChallengeType, CurrentlyReadingItem, LogEntryChanges, LogEntryKind, NewChallenge, NewLogEntry,
    PortError, Profile, ProfileInformation, ProgressUpdate, ReadItem, ReadingChallenge,
    ReadingLogItem, ServiceError, StartReading, TimeFrame,
};
use std::sync::Arc;
use tracing::{error, warn};
use utoipa::OpenApi;
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        get_profile_handler,
        challenges::list_challenges_handler,
        challenges::create_challenge_handler,
        challenges::update_challenge_handler,
        challenges::delete_challenge_handler,
        reading_log::list_reading_log_handler,
        reading_log::create_reading_log_handler,
        reading_log::update_reading_log_handler,
        reading_log::delete_reading_log_handler,
        currently_reading::list_currently_reading_handler,
        currently_reading::start_reading_handler,
        currently_reading::update_progress_handler,
        currently_reading::finish_reading_handler,
        currently_reading::remove_currently_reading_handler,
    ),
    components(
        schemas(
            Profile, ProfileInformation, ReadingChallenge, ChallengeProgress, ChallengeRate,
            ChallengeStatus, ChallengeType, TimeFrame, NewChallenge, ChallengeChanges,
            ReadingLogItem, LogEntryKind, NewLogEntry, LogEntryChanges,
            CurrentlyReadingItem, Book, BookProgress, ReadItem, StartReading, ProgressUpdate,
        )
    ),
    tags(
        (name = "Reading Tracker API", description = "Reading log, shelves and reading challenges.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Error Mapping
//=========================================================================================

/// The error half of every handler's result.
pub type HandlerError = (StatusCode, String);

/// Maps a service failure to a status code and a message safe to show clients.
pub fn into_http_error(e: ServiceError) -> HandlerError {
    match e {
        ServiceError::Validation(reason) => (StatusCode::BAD_REQUEST, reason),
        ServiceError::NotFound(what) | ServiceError::Port(PortError::NotFound(what)) => {
            (StatusCode::NOT_FOUND, format!("{} not found", what))
        }
        ServiceError::Port(PortError::Conflict(reason)) => {
            warn!("Giving up on conflicting profile write: {}", reason);
            (
                StatusCode::CONFLICT,
                "The profile was modified concurrently, please retry".to_string(),
            )
        }
        ServiceError::Port(e) => {
            error!("Profile store failure: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
    }
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Fetch the caller's profile.
///
/// Challenge progress is recomputed from the reading log on every read.
#[utoipa::path(
    get,
    path = "/profile",
    responses(
        (status = 200, description = "The caller's profile", body = Profile),
        (status = 401, description = "Missing or invalid identity header"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("x-user-id" = Uuid, Header,
            description = "Caller's user id. The header name follows IDENTITY_HEADER.")
    )
)]
pub async fn get_profile_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<Profile>, HandlerError> {
    let profile = app_state
        .profiles
        .get_profile(user_id)
        .await
        .map_err(into_http_error)?;
    Ok(Json(profile))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_IDENTITY_HEADER;
    use utoipa::openapi::path::ParameterIn;

    #[test]
    fn test_service_errors_map_to_status_codes() {
        let cases = vec![
            (ServiceError::Validation("bad".to_string()), StatusCode::BAD_REQUEST),
            (ServiceError::NotFound("challenge 1".to_string()), StatusCode::NOT_FOUND),
            (ServiceError::Port(PortError::NotFound("x".to_string())), StatusCode::NOT_FOUND),
            (ServiceError::Port(PortError::Conflict("x".to_string())), StatusCode::CONFLICT),
            (
                ServiceError::Port(PortError::Unexpected("db down".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(into_http_error(error).0, expected);
        }
    }

    #[test]
    fn test_internal_details_are_not_leaked() {
        let (_, message) = into_http_error(ServiceError::Port(PortError::Unexpected(
            "password authentication failed".to_string(),
        )));
        assert!(!message.contains("password"));
    }

    #[test]
    fn test_openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/profile",
            "/challenges",
            "/challenges/{id}",
            "/reading-log",
            "/reading-log/{id}",
            "/currently-reading",
            "/currently-reading/{book_id}",
            "/currently-reading/{book_id}/finish",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }

    #[test]
    fn test_every_operation_documents_the_default_identity_header() {
        let doc = ApiDoc::openapi();
        for (path, item) in &doc.paths.paths {
            let operations = [&item.get, &item.post, &item.put, &item.delete];
            for operation in operations.into_iter().flatten() {
                let documented = operation.parameters.iter().flatten().any(|param| {
                    param.name == DEFAULT_IDENTITY_HEADER
                        && matches!(param.parameter_in, ParameterIn::Header)
                });
                assert!(documented, "{} does not document the identity header", path);
            }
        }
    }
}
