use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::access::PermissionError;
use super::catalog::ValidationError;
use super::domain::{
    BuildingMetadata, GeoPoint, PublicAssessmentId, SectionSubmission, SectionType,
};
use super::repository::AssessmentRepository;
use super::service::{AssessmentService, AssessmentServiceError, ConflictError};
use crate::directory::domain::UserId;
use crate::directory::repository::UserDirectory;

/// Router builder exposing the assessment lifecycle over HTTP. The caller's
/// identity arrives in the `x-actor-id` header; session handling lives in a
/// gateway outside this service.
pub fn assessment_router<R, D>(service: Arc<AssessmentService<R, D>>) -> Router
where
    R: AssessmentRepository + 'static,
    D: UserDirectory + 'static,
{
    Router::new()
        .route(
            "/api/v1/assessments",
            post(create_handler::<R, D>).get(list_handler::<R, D>),
        )
        .route(
            "/api/v1/assessments/:public_id",
            get(detail_handler::<R, D>),
        )
        .route(
            "/api/v1/assessments/:public_id/sections/:section_key",
            put(upsert_section_handler::<R, D>),
        )
        .route(
            "/api/v1/assessments/:public_id/complete",
            post(complete_handler::<R, D>),
        )
        .route(
            "/api/v1/assessments/:public_id/lock",
            post(lock_handler::<R, D>),
        )
        .route(
            "/api/v1/assessments/:public_id/unlock",
            post(unlock_handler::<R, D>),
        )
        .route(
            "/api/v1/assessments/:public_id/archive",
            post(archive_handler::<R, D>),
        )
        .route(
            "/api/v1/assessments/:public_id/edit-requests",
            post(request_edit_handler::<R, D>),
        )
        .route(
            "/api/v1/assessments/:public_id/edit-requests/approve",
            post(approve_edit_handler::<R, D>),
        )
        .route(
            "/api/v1/assessments/:public_id/edit-requests/deny",
            post(deny_edit_handler::<R, D>),
        )
        .route(
            "/api/v1/assessments/:public_id/scorecard.csv",
            get(scorecard_handler::<R, D>),
        )
        .route(
            "/api/v1/assessments/:public_id/activity",
            get(assessment_activity_handler::<R, D>),
        )
        .route("/api/v1/activity", get(activity_feed_handler::<R, D>))
        .with_state(service)
}

const ACTOR_HEADER: &str = "x-actor-id";

fn actor_id(headers: &HeaderMap) -> Result<UserId, Response> {
    let raw = headers
        .get(ACTOR_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            let payload = json!({ "error": "missing x-actor-id header" });
            (StatusCode::UNAUTHORIZED, Json(payload)).into_response()
        })?;

    let id = raw.parse::<Uuid>().map_err(|_| {
        let payload = json!({ "error": "x-actor-id must be a UUID" });
        (StatusCode::UNAUTHORIZED, Json(payload)).into_response()
    })?;

    Ok(UserId(id))
}

fn error_response(error: AssessmentServiceError) -> Response {
    let (status, code) = match &error {
        AssessmentServiceError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, None),
        AssessmentServiceError::Permission(PermissionError::AssessmentLocked { .. }) => {
            // Distinguishable from a plain 403 so clients can offer the
            // edit-request flow instead of a dead end.
            (StatusCode::LOCKED, Some("assessment_locked"))
        }
        AssessmentServiceError::Permission(PermissionError::SubscriptionInactive) => {
            (StatusCode::FORBIDDEN, Some("subscription_inactive"))
        }
        AssessmentServiceError::Permission(_) => (StatusCode::FORBIDDEN, None),
        AssessmentServiceError::NotFound => (StatusCode::NOT_FOUND, None),
        AssessmentServiceError::Conflict(ConflictError::StaleWrite) => {
            (StatusCode::CONFLICT, Some("stale_write"))
        }
        AssessmentServiceError::Conflict(_) => (StatusCode::CONFLICT, None),
        AssessmentServiceError::Repository(_)
        | AssessmentServiceError::Directory(_)
        | AssessmentServiceError::Media(_)
        | AssessmentServiceError::Activity(_)
        | AssessmentServiceError::Export(_) => (StatusCode::INTERNAL_SERVER_ERROR, None),
    };

    let payload = match code {
        Some(code) => json!({ "error": error.to_string(), "code": code }),
        None => json!({ "error": error.to_string() }),
    };
    (status, Json(payload)).into_response()
}

#[derive(Debug, Deserialize)]
struct CreateAssessmentRequest {
    client_id: Uuid,
    building: BuildingMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct SectionBody {
    #[serde(default)]
    variables: BTreeMap<String, u16>,
    #[serde(default)]
    location_data: BTreeMap<String, GeoPoint>,
    #[serde(default)]
    completed: bool,
}

#[derive(Debug, Deserialize)]
struct EditRequestBody {
    reason: String,
}

#[derive(Debug, Default, Deserialize)]
struct ReasonBody {
    reason: Option<String>,
}

async fn create_handler<R, D>(
    State(service): State<Arc<AssessmentService<R, D>>>,
    headers: HeaderMap,
    Json(request): Json<CreateAssessmentRequest>,
) -> Response
where
    R: AssessmentRepository + 'static,
    D: UserDirectory + 'static,
{
    let actor = match actor_id(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match service.create_assessment(&actor, &UserId(request.client_id), request.building) {
        Ok(assessment) => {
            let view = super::service::AssessmentSummary::from(&assessment);
            (StatusCode::CREATED, Json(view)).into_response()
        }
        Err(error) => error_response(error),
    }
}

async fn list_handler<R, D>(
    State(service): State<Arc<AssessmentService<R, D>>>,
    headers: HeaderMap,
) -> Response
where
    R: AssessmentRepository + 'static,
    D: UserDirectory + 'static,
{
    let actor = match actor_id(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match service.list_for_actor(&actor) {
        Ok(summaries) => (StatusCode::OK, Json(summaries)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn detail_handler<R, D>(
    State(service): State<Arc<AssessmentService<R, D>>>,
    headers: HeaderMap,
    Path(public_id): Path<Uuid>,
) -> Response
where
    R: AssessmentRepository + 'static,
    D: UserDirectory + 'static,
{
    let actor = match actor_id(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match service.get_assessment(&actor, &PublicAssessmentId(public_id)) {
        Ok(detail) => (StatusCode::OK, Json(detail)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn upsert_section_handler<R, D>(
    State(service): State<Arc<AssessmentService<R, D>>>,
    headers: HeaderMap,
    Path((public_id, section_key)): Path<(Uuid, String)>,
    Json(body): Json<SectionBody>,
) -> Response
where
    R: AssessmentRepository + 'static,
    D: UserDirectory + 'static,
{
    let actor = match actor_id(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    let Some(section_type) = SectionType::from_key(&section_key) else {
        return error_response(ValidationError::UnknownSection(section_key).into());
    };

    let submission = SectionSubmission {
        section_type,
        variables: body.variables,
        location_data: body.location_data,
        completed: body.completed,
    };

    match service.upsert_section(&actor, &PublicAssessmentId(public_id), submission) {
        Ok(assessment) => {
            let view = super::service::AssessmentSummary::from(&assessment);
            (StatusCode::OK, Json(view)).into_response()
        }
        Err(error) => error_response(error),
    }
}

async fn complete_handler<R, D>(
    State(service): State<Arc<AssessmentService<R, D>>>,
    headers: HeaderMap,
    Path(public_id): Path<Uuid>,
) -> Response
where
    R: AssessmentRepository + 'static,
    D: UserDirectory + 'static,
{
    let actor = match actor_id(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match service.complete_assessment(&actor, &PublicAssessmentId(public_id)) {
        Ok(assessment) => {
            let view = super::service::AssessmentSummary::from(&assessment);
            (StatusCode::OK, Json(view)).into_response()
        }
        Err(error) => error_response(error),
    }
}

async fn lock_handler<R, D>(
    State(service): State<Arc<AssessmentService<R, D>>>,
    headers: HeaderMap,
    Path(public_id): Path<Uuid>,
    body: Option<Json<ReasonBody>>,
) -> Response
where
    R: AssessmentRepository + 'static,
    D: UserDirectory + 'static,
{
    let actor = match actor_id(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    let reason = body.and_then(|Json(body)| body.reason);

    match service.lock_assessment(&actor, &PublicAssessmentId(public_id), reason) {
        Ok(assessment) => {
            let view = super::service::AssessmentSummary::from(&assessment);
            (StatusCode::OK, Json(view)).into_response()
        }
        Err(error) => error_response(error),
    }
}

async fn unlock_handler<R, D>(
    State(service): State<Arc<AssessmentService<R, D>>>,
    headers: HeaderMap,
    Path(public_id): Path<Uuid>,
) -> Response
where
    R: AssessmentRepository + 'static,
    D: UserDirectory + 'static,
{
    let actor = match actor_id(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match service.unlock_assessment(&actor, &PublicAssessmentId(public_id)) {
        Ok(assessment) => {
            let view = super::service::AssessmentSummary::from(&assessment);
            (StatusCode::OK, Json(view)).into_response()
        }
        Err(error) => error_response(error),
    }
}

async fn archive_handler<R, D>(
    State(service): State<Arc<AssessmentService<R, D>>>,
    headers: HeaderMap,
    Path(public_id): Path<Uuid>,
) -> Response
where
    R: AssessmentRepository + 'static,
    D: UserDirectory + 'static,
{
    let actor = match actor_id(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match service.archive_assessment(&actor, &PublicAssessmentId(public_id)) {
        Ok(assessment) => {
            let view = super::service::AssessmentSummary::from(&assessment);
            (StatusCode::OK, Json(view)).into_response()
        }
        Err(error) => error_response(error),
    }
}

async fn request_edit_handler<R, D>(
    State(service): State<Arc<AssessmentService<R, D>>>,
    headers: HeaderMap,
    Path(public_id): Path<Uuid>,
    Json(body): Json<EditRequestBody>,
) -> Response
where
    R: AssessmentRepository + 'static,
    D: UserDirectory + 'static,
{
    let actor = match actor_id(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match service.request_edit(&actor, &PublicAssessmentId(public_id), body.reason) {
        Ok(assessment) => {
            let view = super::service::AssessmentSummary::from(&assessment);
            (StatusCode::ACCEPTED, Json(view)).into_response()
        }
        Err(error) => error_response(error),
    }
}

async fn approve_edit_handler<R, D>(
    State(service): State<Arc<AssessmentService<R, D>>>,
    headers: HeaderMap,
    Path(public_id): Path<Uuid>,
) -> Response
where
    R: AssessmentRepository + 'static,
    D: UserDirectory + 'static,
{
    let actor = match actor_id(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match service.approve_edit(&actor, &PublicAssessmentId(public_id)) {
        Ok(assessment) => {
            let view = super::service::AssessmentSummary::from(&assessment);
            (StatusCode::OK, Json(view)).into_response()
        }
        Err(error) => error_response(error),
    }
}

async fn deny_edit_handler<R, D>(
    State(service): State<Arc<AssessmentService<R, D>>>,
    headers: HeaderMap,
    Path(public_id): Path<Uuid>,
    body: Option<Json<ReasonBody>>,
) -> Response
where
    R: AssessmentRepository + 'static,
    D: UserDirectory + 'static,
{
    let actor = match actor_id(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    let reason = body.and_then(|Json(body)| body.reason);

    match service.deny_edit(&actor, &PublicAssessmentId(public_id), reason) {
        Ok(assessment) => {
            let view = super::service::AssessmentSummary::from(&assessment);
            (StatusCode::OK, Json(view)).into_response()
        }
        Err(error) => error_response(error),
    }
}

async fn scorecard_handler<R, D>(
    State(service): State<Arc<AssessmentService<R, D>>>,
    headers: HeaderMap,
    Path(public_id): Path<Uuid>,
) -> Response
where
    R: AssessmentRepository + 'static,
    D: UserDirectory + 'static,
{
    let actor = match actor_id(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match service.scorecard_csv(&actor, &PublicAssessmentId(public_id)) {
        Ok(csv_body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
            csv_body,
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

async fn assessment_activity_handler<R, D>(
    State(service): State<Arc<AssessmentService<R, D>>>,
    headers: HeaderMap,
    Path(public_id): Path<Uuid>,
) -> Response
where
    R: AssessmentRepository + 'static,
    D: UserDirectory + 'static,
{
    let actor = match actor_id(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match service.activity_for_assessment(&actor, &PublicAssessmentId(public_id)) {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn activity_feed_handler<R, D>(
    State(service): State<Arc<AssessmentService<R, D>>>,
    headers: HeaderMap,
) -> Response
where
    R: AssessmentRepository + 'static,
    D: UserDirectory + 'static,
{
    let actor = match actor_id(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match service.activity_feed(&actor) {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(error) => error_response(error),
    }
}
