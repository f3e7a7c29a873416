use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use nanapatha_core::{AppError, ErrorResponse};
use nanapatha_models::class_sessions::ClassSessionDetail;
use nanapatha_models::ids::UserId;
use nanapatha_models::students::AssignBatchDto;

use crate::modules::schedule::service::ScheduleService;
use crate::modules::teachers::model::{
    CreateTeacherDto, CreatedTeacher, PaginatedTeachersResponse, Teacher, TeacherBatchAssignment,
    TeacherFilterParams, TeacherPerformance, TeachingLoad, UpdateTeacherDto,
};
use crate::modules::teachers::service::TeacherService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/teachers",
    request_body = CreateTeacherDto,
    responses(
        (status = 201, description = "Teacher created; the temporary password is shown once", body = CreatedTeacher),
        (status = 400, description = "Duplicate email", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Teachers"
)]
#[instrument(skip(state, dto))]
pub async fn create_teacher(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateTeacherDto>,
) -> Result<(StatusCode, Json<CreatedTeacher>), AppError> {
    let teacher = TeacherService::create_teacher(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(teacher)))
}

#[utoipa::path(
    get,
    path = "/api/teachers",
    params(TeacherFilterParams),
    responses(
        (status = 200, description = "Paginated teachers ordered by name", body = PaginatedTeachersResponse)
    ),
    tag = "Teachers"
)]
#[instrument(skip(state))]
pub async fn get_teachers(
    State(state): State<AppState>,
    Query(filters): Query<TeacherFilterParams>,
) -> Result<Json<PaginatedTeachersResponse>, AppError> {
    let teachers = TeacherService::get_teachers(&state.db, filters).await?;
    Ok(Json(teachers))
}

#[utoipa::path(
    get,
    path = "/api/teachers/{id}",
    params(("id" = String, Path, description = "Teacher user ID")),
    responses(
        (status = 200, description = "Teacher details", body = Teacher),
        (status = 404, description = "Teacher not found", body = ErrorResponse)
    ),
    tag = "Teachers"
)]
#[instrument(skip(state))]
pub async fn get_teacher(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<Json<Teacher>, AppError> {
    let teacher = TeacherService::get_teacher(&state.db, id).await?;
    Ok(Json(teacher))
}

#[utoipa::path(
    put,
    path = "/api/teachers/{id}",
    params(("id" = String, Path, description = "Teacher user ID")),
    request_body = UpdateTeacherDto,
    responses(
        (status = 200, description = "Teacher updated", body = Teacher),
        (status = 400, description = "Duplicate email", body = ErrorResponse),
        (status = 404, description = "Teacher not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Teachers"
)]
#[instrument(skip(state, dto))]
pub async fn update_teacher(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    ValidatedJson(dto): ValidatedJson<UpdateTeacherDto>,
) -> Result<Json<Teacher>, AppError> {
    let teacher = TeacherService::update_teacher(&state.db, id, dto).await?;
    Ok(Json(teacher))
}

#[utoipa::path(
    delete,
    path = "/api/teachers/{id}",
    params(("id" = String, Path, description = "Teacher user ID")),
    responses(
        (status = 200, description = "Teacher deactivated", body = Teacher),
        (status = 404, description = "Teacher not found", body = ErrorResponse)
    ),
    tag = "Teachers"
)]
#[instrument(skip(state))]
pub async fn deactivate_teacher(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<Json<Teacher>, AppError> {
    let teacher = TeacherService::deactivate_teacher(&state.db, id).await?;
    Ok(Json(teacher))
}

#[utoipa::path(
    put,
    path = "/api/teachers/{id}/batch",
    params(("id" = String, Path, description = "Teacher user ID")),
    request_body = AssignBatchDto,
    responses(
        (status = 200, description = "Teacher assignment changed", body = TeacherBatchAssignment),
        (status = 400, description = "Teacher is inactive", body = ErrorResponse),
        (status = 404, description = "Teacher or batch not found", body = ErrorResponse)
    ),
    tag = "Teachers"
)]
#[instrument(skip(state))]
pub async fn assign_teacher_batch(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    Json(dto): Json<AssignBatchDto>,
) -> Result<Json<TeacherBatchAssignment>, AppError> {
    let assignment = TeacherService::assign_batch(&state.db, id, dto.batch_id).await?;
    Ok(Json(assignment))
}

#[utoipa::path(
    get,
    path = "/api/teachers/{id}/load",
    params(("id" = String, Path, description = "Teacher user ID")),
    responses(
        (status = 200, description = "Assigned batches and student totals", body = TeachingLoad),
        (status = 404, description = "Teacher not found", body = ErrorResponse)
    ),
    tag = "Teachers"
)]
#[instrument(skip(state))]
pub async fn get_teacher_load(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<Json<TeachingLoad>, AppError> {
    let load = TeacherService::teaching_load(&state.db, id).await?;
    Ok(Json(load))
}

#[utoipa::path(
    get,
    path = "/api/teachers/{id}/performance",
    params(("id" = String, Path, description = "Teacher user ID")),
    responses(
        (status = 200, description = "Session and student totals", body = TeacherPerformance),
        (status = 404, description = "Teacher not found", body = ErrorResponse)
    ),
    tag = "Teachers"
)]
#[instrument(skip(state))]
pub async fn get_teacher_performance(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<Json<TeacherPerformance>, AppError> {
    let performance = TeacherService::performance(&state.db, id).await?;
    Ok(Json(performance))
}

#[utoipa::path(
    get,
    path = "/api/teachers/{id}/schedule",
    params(("id" = String, Path, description = "Teacher user ID")),
    responses(
        (status = 200, description = "Sessions taught, in date order", body = Vec<ClassSessionDetail>),
        (status = 404, description = "Teacher not found", body = ErrorResponse)
    ),
    tag = "Teachers"
)]
#[instrument(skip(state))]
pub async fn get_teacher_schedule(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<Json<Vec<ClassSessionDetail>>, AppError> {
    TeacherService::get_teacher(&state.db, id).await?;
    let sessions = ScheduleService::teacher_sessions(&state.db, id).await?;
    Ok(Json(sessions))
}
