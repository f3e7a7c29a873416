use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use nanapatha_core::{AppError, ErrorResponse};
use nanapatha_models::ids::RegistrationRequestId;

use crate::middleware::Actor;
use crate::modules::registrations::model::{
    AcceptedRegistration, PaginatedRegistrationsResponse, RegistrationDetail,
    RegistrationFilterParams, RegistrationRequest, RejectRegistrationDto,
    SubmitExistingRegistrationDto, SubmitNewRegistrationDto,
};
use crate::modules::registrations::service::RegistrationService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/registrations/new",
    request_body = SubmitNewRegistrationDto,
    responses(
        (status = 201, description = "Registration submitted", body = RegistrationRequest),
        (status = 400, description = "Bad request or unknown batch", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Registrations"
)]
#[instrument(skip(state, dto))]
pub async fn submit_new_registration(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<SubmitNewRegistrationDto>,
) -> Result<(StatusCode, Json<RegistrationRequest>), AppError> {
    let request = RegistrationService::submit_new(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

#[utoipa::path(
    post,
    path = "/api/registrations/existing",
    request_body = SubmitExistingRegistrationDto,
    responses(
        (status = 201, description = "Registration submitted", body = RegistrationRequest),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Registrations"
)]
#[instrument(skip(state, dto))]
pub async fn submit_existing_registration(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<SubmitExistingRegistrationDto>,
) -> Result<(StatusCode, Json<RegistrationRequest>), AppError> {
    let request = RegistrationService::submit_existing(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

#[utoipa::path(
    get,
    path = "/api/registrations",
    params(RegistrationFilterParams),
    responses(
        (status = 200, description = "Review queue, newest first", body = PaginatedRegistrationsResponse)
    ),
    tag = "Registrations"
)]
#[instrument(skip(state))]
pub async fn get_registrations(
    State(state): State<AppState>,
    Query(filters): Query<RegistrationFilterParams>,
) -> Result<Json<PaginatedRegistrationsResponse>, AppError> {
    let requests = RegistrationService::list(&state.db, filters).await?;
    Ok(Json(requests))
}

#[utoipa::path(
    get,
    path = "/api/registrations/{id}",
    params(("id" = String, Path, description = "Registration request ID")),
    responses(
        (status = 200, description = "Registration request with its selected batch", body = RegistrationDetail),
        (status = 404, description = "Registration request not found", body = ErrorResponse)
    ),
    tag = "Registrations"
)]
#[instrument(skip(state))]
pub async fn get_registration(
    State(state): State<AppState>,
    Path(id): Path<RegistrationRequestId>,
) -> Result<Json<RegistrationDetail>, AppError> {
    let detail = RegistrationService::get(&state.db, id).await?;
    Ok(Json(detail))
}

#[utoipa::path(
    post,
    path = "/api/registrations/{id}/accept",
    params(
        ("id" = String, Path, description = "Registration request ID"),
        ("X-Actor" = Option<String>, Header, description = "Reviewer name")
    ),
    responses(
        (status = 200, description = "Accepted; the temporary password is shown once", body = AcceptedRegistration),
        (status = 400, description = "Duplicate email or student number", body = ErrorResponse),
        (status = 404, description = "Registration request not found", body = ErrorResponse),
        (status = 409, description = "Already processed, claimed by another reviewer, or batch full", body = ErrorResponse)
    ),
    tag = "Registrations"
)]
#[instrument(skip(state))]
pub async fn accept_registration(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<RegistrationRequestId>,
) -> Result<Json<AcceptedRegistration>, AppError> {
    let accepted = RegistrationService::accept(&state.db, id, actor.as_str()).await?;
    Ok(Json(accepted))
}

#[utoipa::path(
    post,
    path = "/api/registrations/{id}/reject",
    params(
        ("id" = String, Path, description = "Registration request ID"),
        ("X-Actor" = Option<String>, Header, description = "Reviewer name")
    ),
    request_body = RejectRegistrationDto,
    responses(
        (status = 200, description = "Rejected", body = RegistrationRequest),
        (status = 400, description = "Missing reason", body = ErrorResponse),
        (status = 404, description = "Registration request not found", body = ErrorResponse),
        (status = 409, description = "Already processed or claimed by another reviewer", body = ErrorResponse)
    ),
    tag = "Registrations"
)]
#[instrument(skip(state, dto))]
pub async fn reject_registration(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<RegistrationRequestId>,
    Json(dto): Json<RejectRegistrationDto>,
) -> Result<Json<RegistrationRequest>, AppError> {
    let request = RegistrationService::reject(&state.db, id, &dto.reason, actor.as_str()).await?;
    Ok(Json(request))
}

#[utoipa::path(
    post,
    path = "/api/registrations/{id}/claim",
    params(
        ("id" = String, Path, description = "Registration request ID"),
        ("X-Actor" = Option<String>, Header, description = "Reviewer name")
    ),
    responses(
        (status = 200, description = "Claimed", body = RegistrationRequest),
        (status = 404, description = "Registration request not found", body = ErrorResponse),
        (status = 409, description = "Already processed or claimed by another reviewer", body = ErrorResponse)
    ),
    tag = "Registrations"
)]
#[instrument(skip(state))]
pub async fn claim_registration(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<RegistrationRequestId>,
) -> Result<Json<RegistrationRequest>, AppError> {
    let request = RegistrationService::claim(&state.db, id, actor.as_str()).await?;
    Ok(Json(request))
}

#[utoipa::path(
    post,
    path = "/api/registrations/{id}/release",
    params(
        ("id" = String, Path, description = "Registration request ID"),
        ("X-Actor" = Option<String>, Header, description = "Reviewer name")
    ),
    responses(
        (status = 200, description = "Claim released", body = RegistrationRequest),
        (status = 404, description = "Registration request not found", body = ErrorResponse),
        (status = 409, description = "Claimed by another reviewer", body = ErrorResponse)
    ),
    tag = "Registrations"
)]
#[instrument(skip(state))]
pub async fn release_registration(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<RegistrationRequestId>,
) -> Result<Json<RegistrationRequest>, AppError> {
    let request = RegistrationService::release(&state.db, id, actor.as_str()).await?;
    Ok(Json(request))
}

#[utoipa::path(
    post,
    path = "/api/registrations/{id}/mark-paid",
    params(
        ("id" = String, Path, description = "Registration request ID"),
        ("X-Actor" = Option<String>, Header, description = "Reviewer name")
    ),
    responses(
        (status = 200, description = "Payment recorded", body = RegistrationRequest),
        (status = 404, description = "Registration request not found", body = ErrorResponse)
    ),
    tag = "Registrations"
)]
#[instrument(skip(state))]
pub async fn mark_registration_paid(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<RegistrationRequestId>,
) -> Result<Json<RegistrationRequest>, AppError> {
    let request = RegistrationService::mark_paid(&state.db, id, actor.as_str()).await?;
    Ok(Json(request))
}
