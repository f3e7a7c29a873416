use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use nanapatha_core::{AppError, ErrorResponse};
use nanapatha_models::ids::{BatchId, UserId};
use nanapatha_models::students::StudentBatchAssignment;

use crate::modules::assignments::AssignmentService;
use crate::modules::batches::model::{
    BatchDetail, BatchFilterParams, BatchRoster, BatchStudentDto, BatchSummary, CreateBatchDto,
    PaginatedBatchesResponse, ReconcileReport, SetBatchTeacherDto, UpdateBatchDto,
};
use crate::modules::batches::service::BatchService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/batches",
    request_body = CreateBatchDto,
    responses(
        (status = 201, description = "Batch created", body = BatchSummary),
        (status = 400, description = "Bad request or inactive teacher", body = ErrorResponse),
        (status = 404, description = "Teacher not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Batches"
)]
#[instrument(skip(state, dto))]
pub async fn create_batch(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateBatchDto>,
) -> Result<(StatusCode, Json<BatchSummary>), AppError> {
    let batch = BatchService::create_batch(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(batch)))
}

#[utoipa::path(
    get,
    path = "/api/batches",
    params(BatchFilterParams),
    responses(
        (status = 200, description = "Paginated batches", body = PaginatedBatchesResponse)
    ),
    tag = "Batches"
)]
#[instrument(skip(state))]
pub async fn get_batches(
    State(state): State<AppState>,
    Query(filters): Query<BatchFilterParams>,
) -> Result<Json<PaginatedBatchesResponse>, AppError> {
    let batches = BatchService::get_batches(&state.db, filters).await?;
    Ok(Json(batches))
}

#[utoipa::path(
    get,
    path = "/api/batches/{id}",
    params(("id" = String, Path, description = "Batch ID")),
    responses(
        (status = 200, description = "Batch with teacher and students", body = BatchDetail),
        (status = 404, description = "Batch not found", body = ErrorResponse)
    ),
    tag = "Batches"
)]
#[instrument(skip(state))]
pub async fn get_batch(
    State(state): State<AppState>,
    Path(id): Path<BatchId>,
) -> Result<Json<BatchDetail>, AppError> {
    let batch = BatchService::get_batch(&state.db, id).await?;
    Ok(Json(batch))
}

#[utoipa::path(
    put,
    path = "/api/batches/{id}",
    params(("id" = String, Path, description = "Batch ID")),
    request_body = UpdateBatchDto,
    responses(
        (status = 200, description = "Batch updated", body = BatchSummary),
        (status = 400, description = "Capacity below current enrollment", body = ErrorResponse),
        (status = 404, description = "Batch not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Batches"
)]
#[instrument(skip(state, dto))]
pub async fn update_batch(
    State(state): State<AppState>,
    Path(id): Path<BatchId>,
    ValidatedJson(dto): ValidatedJson<UpdateBatchDto>,
) -> Result<Json<BatchSummary>, AppError> {
    let batch = BatchService::update_batch(&state.db, id, dto).await?;
    Ok(Json(batch))
}

#[utoipa::path(
    delete,
    path = "/api/batches/{id}",
    params(("id" = String, Path, description = "Batch ID")),
    responses(
        (status = 200, description = "Batch archived", body = BatchSummary),
        (status = 404, description = "Batch not found", body = ErrorResponse)
    ),
    tag = "Batches"
)]
#[instrument(skip(state))]
pub async fn archive_batch(
    State(state): State<AppState>,
    Path(id): Path<BatchId>,
) -> Result<Json<BatchSummary>, AppError> {
    let batch = BatchService::archive_batch(&state.db, id).await?;
    Ok(Json(batch))
}

#[utoipa::path(
    get,
    path = "/api/batches/{id}/roster",
    params(("id" = String, Path, description = "Batch ID")),
    responses(
        (status = 200, description = "Current and assignable students", body = BatchRoster),
        (status = 404, description = "Batch not found", body = ErrorResponse)
    ),
    tag = "Batches"
)]
#[instrument(skip(state))]
pub async fn get_batch_roster(
    State(state): State<AppState>,
    Path(id): Path<BatchId>,
) -> Result<Json<BatchRoster>, AppError> {
    let roster = BatchService::get_roster(&state.db, id).await?;
    Ok(Json(roster))
}

#[utoipa::path(
    post,
    path = "/api/batches/{id}/students",
    params(("id" = String, Path, description = "Batch ID")),
    request_body = BatchStudentDto,
    responses(
        (status = 200, description = "Student seated", body = StudentBatchAssignment),
        (status = 400, description = "Student already in a batch, or batch archived", body = ErrorResponse),
        (status = 404, description = "Batch or student not found", body = ErrorResponse),
        (status = 409, description = "Batch is full", body = ErrorResponse)
    ),
    tag = "Batches"
)]
#[instrument(skip(state))]
pub async fn add_batch_student(
    State(state): State<AppState>,
    Path(id): Path<BatchId>,
    Json(dto): Json<BatchStudentDto>,
) -> Result<Json<StudentBatchAssignment>, AppError> {
    let assignment = BatchService::add_student(&state.db, id, dto.student_id).await?;
    Ok(Json(assignment))
}

#[utoipa::path(
    delete,
    path = "/api/batches/{id}/students/{student_id}",
    params(
        ("id" = String, Path, description = "Batch ID"),
        ("student_id" = String, Path, description = "Student user ID")
    ),
    responses(
        (status = 200, description = "Student removed", body = StudentBatchAssignment),
        (status = 404, description = "Student is not in this batch", body = ErrorResponse)
    ),
    tag = "Batches"
)]
#[instrument(skip(state))]
pub async fn remove_batch_student(
    State(state): State<AppState>,
    Path((id, student_id)): Path<(BatchId, UserId)>,
) -> Result<Json<StudentBatchAssignment>, AppError> {
    let assignment = BatchService::remove_student(&state.db, id, student_id).await?;
    Ok(Json(assignment))
}

#[utoipa::path(
    put,
    path = "/api/batches/{id}/teacher",
    params(("id" = String, Path, description = "Batch ID")),
    request_body = SetBatchTeacherDto,
    responses(
        (status = 200, description = "Teacher set or cleared", body = BatchSummary),
        (status = 400, description = "Teacher is inactive", body = ErrorResponse),
        (status = 404, description = "Batch or teacher not found", body = ErrorResponse)
    ),
    tag = "Batches"
)]
#[instrument(skip(state))]
pub async fn set_batch_teacher(
    State(state): State<AppState>,
    Path(id): Path<BatchId>,
    Json(dto): Json<SetBatchTeacherDto>,
) -> Result<Json<BatchSummary>, AppError> {
    let batch = BatchService::set_teacher(&state.db, id, dto.teacher_id).await?;
    Ok(Json(batch))
}

#[utoipa::path(
    post,
    path = "/api/batches/reconcile",
    responses(
        (status = 200, description = "Enrollment counters recomputed", body = ReconcileReport)
    ),
    tag = "Batches"
)]
#[instrument(skip(state))]
pub async fn reconcile_enrollment(
    State(state): State<AppState>,
) -> Result<Json<ReconcileReport>, AppError> {
    let batches_corrected = AssignmentService::reconcile_enrollment(&state.db).await?;
    Ok(Json(ReconcileReport { batches_corrected }))
}
