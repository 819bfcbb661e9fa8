use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::domain::{ClientSubscription, InvitationToken, Role, UserId};
use super::repository::UserDirectory;
use super::service::{DirectoryError, DirectoryService};

/// Admin-facing user management endpoints plus the public invitation
/// acceptance route.
pub fn directory_router<D>(service: Arc<DirectoryService<D>>) -> Router
where
    D: UserDirectory + 'static,
{
    Router::new()
        .route("/api/v1/users", post(create_user_handler::<D>))
        .route("/api/v1/users/:user_id/suspend", post(suspend_handler::<D>))
        .route(
            "/api/v1/users/:user_id/reactivate",
            post(reactivate_handler::<D>),
        )
        .route(
            "/api/v1/users/:user_id/subscription",
            put(subscription_handler::<D>),
        )
        .route("/api/v1/invitations", post(invite_handler::<D>))
        .route(
            "/api/v1/invitations/:token/accept",
            post(accept_invitation_handler::<D>),
        )
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

fn error_response(error: DirectoryError) -> Response {
    let status = match &error {
        DirectoryError::AdminRequired { .. }
        | DirectoryError::UnknownActor(_)
        | DirectoryError::ActorInactive => StatusCode::FORBIDDEN,
        DirectoryError::UserNotFound(_) | DirectoryError::InvitationNotFound => {
            StatusCode::NOT_FOUND
        }
        DirectoryError::EmailTaken(_) => StatusCode::CONFLICT,
        DirectoryError::InvitationClosed => StatusCode::GONE,
        DirectoryError::SubscriptionRequiresClient => StatusCode::UNPROCESSABLE_ENTITY,
        DirectoryError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}

#[derive(Debug, Deserialize)]
struct CreateUserRequest {
    email: String,
    full_name: String,
    role: Role,
    #[serde(default)]
    subscription: Option<ClientSubscription>,
}

#[derive(Debug, Deserialize)]
struct InviteRequest {
    email: String,
    role: Role,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AcceptInvitationRequest {
    full_name: String,
}

async fn create_user_handler<D>(
    State(service): State<Arc<DirectoryService<D>>>,
    headers: HeaderMap,
    Json(request): Json<CreateUserRequest>,
) -> Response
where
    D: UserDirectory + 'static,
{
    let actor = match actor_id(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match service.create_user(
        &actor,
        request.email,
        request.full_name,
        request.role,
        request.subscription,
    ) {
        Ok(account) => (StatusCode::CREATED, Json(account)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn invite_handler<D>(
    State(service): State<Arc<DirectoryService<D>>>,
    headers: HeaderMap,
    Json(request): Json<InviteRequest>,
) -> Response
where
    D: UserDirectory + 'static,
{
    let actor = match actor_id(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match service.invite(&actor, request.email, request.role, request.message) {
        Ok(invitation) => (StatusCode::CREATED, Json(invitation)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn accept_invitation_handler<D>(
    State(service): State<Arc<DirectoryService<D>>>,
    Path(token): Path<Uuid>,
    Json(request): Json<AcceptInvitationRequest>,
) -> Response
where
    D: UserDirectory + 'static,
{
    match service.accept_invitation(&InvitationToken(token), request.full_name) {
        Ok(account) => (StatusCode::CREATED, Json(account)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn suspend_handler<D>(
    State(service): State<Arc<DirectoryService<D>>>,
    headers: HeaderMap,
    Path(user_id): Path<Uuid>,
) -> Response
where
    D: UserDirectory + 'static,
{
    let actor = match actor_id(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match service.suspend_user(&actor, &UserId(user_id)) {
        Ok(account) => (StatusCode::OK, Json(account)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn reactivate_handler<D>(
    State(service): State<Arc<DirectoryService<D>>>,
    headers: HeaderMap,
    Path(user_id): Path<Uuid>,
) -> Response
where
    D: UserDirectory + 'static,
{
    let actor = match actor_id(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match service.reactivate_user(&actor, &UserId(user_id)) {
        Ok(account) => (StatusCode::OK, Json(account)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn subscription_handler<D>(
    State(service): State<Arc<DirectoryService<D>>>,
    headers: HeaderMap,
    Path(user_id): Path<Uuid>,
    Json(subscription): Json<ClientSubscription>,
) -> Response
where
    D: UserDirectory + 'static,
{
    let actor = match actor_id(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match service.update_subscription(&actor, &UserId(user_id), subscription) {
        Ok(account) => (StatusCode::OK, Json(account)).into_response(),
        Err(error) => error_response(error),
    }
}
