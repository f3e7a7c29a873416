use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Local;
use tracing::instrument;

use nanapatha_core::{AppError, ErrorResponse};
use nanapatha_models::ids::ClassSessionId;

use crate::modules::schedule::model::{
    ClassSessionDetail, ClassSessionFilterParams, CreateClassSessionDto,
    PaginatedClassSessionsResponse, ScheduleQuery, ScheduleView, UpdateSessionStatusDto,
};
use crate::modules::schedule::service::ScheduleService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/schedule",
    params(ScheduleQuery),
    responses(
        (status = 200, description = "Week, today, active and upcoming sessions", body = ScheduleView),
        (status = 400, description = "Invalid date or time", body = ErrorResponse)
    ),
    tag = "Schedule"
)]
#[instrument(skip(state))]
pub async fn get_schedule(
    State(state): State<AppState>,
    Query(query): Query<ScheduleQuery>,
) -> Result<Json<ScheduleView>, AppError> {
    let now = Local::now().naive_local();
    let date = query.date.unwrap_or(now.date());
    let time = query.time.unwrap_or(now.time());

    let view = ScheduleService::schedule_view(&state.db, date, time).await?;
    Ok(Json(view))
}

#[utoipa::path(
    post,
    path = "/api/sessions",
    request_body = CreateClassSessionDto,
    responses(
        (status = 201, description = "Session scheduled", body = ClassSessionDetail),
        (status = 400, description = "Teacher user is not a teacher", body = ErrorResponse),
        (status = 404, description = "Batch, teacher or classroom not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Sessions"
)]
#[instrument(skip(state, dto))]
pub async fn create_session(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateClassSessionDto>,
) -> Result<(StatusCode, Json<ClassSessionDetail>), AppError> {
    let session = ScheduleService::create_session(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

#[utoipa::path(
    get,
    path = "/api/sessions",
    params(ClassSessionFilterParams),
    responses(
        (status = 200, description = "Paginated sessions in date order", body = PaginatedClassSessionsResponse)
    ),
    tag = "Sessions"
)]
#[instrument(skip(state))]
pub async fn get_sessions(
    State(state): State<AppState>,
    Query(filters): Query<ClassSessionFilterParams>,
) -> Result<Json<PaginatedClassSessionsResponse>, AppError> {
    let sessions = ScheduleService::list_sessions(&state.db, filters).await?;
    Ok(Json(sessions))
}

#[utoipa::path(
    get,
    path = "/api/sessions/{id}",
    params(("id" = String, Path, description = "Class session ID")),
    responses(
        (status = 200, description = "Session details", body = ClassSessionDetail),
        (status = 404, description = "Class session not found", body = ErrorResponse)
    ),
    tag = "Sessions"
)]
#[instrument(skip(state))]
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<ClassSessionId>,
) -> Result<Json<ClassSessionDetail>, AppError> {
    let session = ScheduleService::get_session(&state.db, id).await?;
    Ok(Json(session))
}

#[utoipa::path(
    put,
    path = "/api/sessions/{id}/status",
    params(("id" = String, Path, description = "Class session ID")),
    request_body = UpdateSessionStatusDto,
    responses(
        (status = 200, description = "Status changed", body = ClassSessionDetail),
        (status = 404, description = "Class session not found", body = ErrorResponse),
        (status = 409, description = "Session is already completed or cancelled", body = ErrorResponse)
    ),
    tag = "Sessions"
)]
#[instrument(skip(state))]
pub async fn update_session_status(
    State(state): State<AppState>,
    Path(id): Path<ClassSessionId>,
    Json(dto): Json<UpdateSessionStatusDto>,
) -> Result<Json<ClassSessionDetail>, AppError> {
    let session = ScheduleService::update_session_status(&state.db, id, dto.status).await?;
    Ok(Json(session))
}
