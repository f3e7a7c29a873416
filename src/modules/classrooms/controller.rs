use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use nanapatha_core::{AppError, ErrorResponse};
use nanapatha_models::ids::ClassroomId;

use crate::modules::classrooms::model::{
    Classroom, ClassroomFilterParams, CreateClassroomDto, PaginatedClassroomsResponse,
    UpdateClassroomDto,
};
use crate::modules::classrooms::service::ClassroomService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/classrooms",
    request_body = CreateClassroomDto,
    responses(
        (status = 201, description = "Classroom created", body = Classroom),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Classrooms"
)]
#[instrument(skip(state, dto))]
pub async fn create_classroom(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateClassroomDto>,
) -> Result<(StatusCode, Json<Classroom>), AppError> {
    let classroom = ClassroomService::create_classroom(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(classroom)))
}

#[utoipa::path(
    get,
    path = "/api/classrooms",
    params(ClassroomFilterParams),
    responses(
        (status = 200, description = "Paginated classrooms", body = PaginatedClassroomsResponse)
    ),
    tag = "Classrooms"
)]
#[instrument(skip(state))]
pub async fn get_classrooms(
    State(state): State<AppState>,
    Query(filters): Query<ClassroomFilterParams>,
) -> Result<Json<PaginatedClassroomsResponse>, AppError> {
    let classrooms = ClassroomService::get_classrooms(&state.db, filters).await?;
    Ok(Json(classrooms))
}

#[utoipa::path(
    get,
    path = "/api/classrooms/{id}",
    params(("id" = String, Path, description = "Classroom ID")),
    responses(
        (status = 200, description = "Classroom details", body = Classroom),
        (status = 404, description = "Classroom not found", body = ErrorResponse)
    ),
    tag = "Classrooms"
)]
#[instrument(skip(state))]
pub async fn get_classroom(
    State(state): State<AppState>,
    Path(id): Path<ClassroomId>,
) -> Result<Json<Classroom>, AppError> {
    let classroom = ClassroomService::get_classroom(&state.db, id).await?;
    Ok(Json(classroom))
}

#[utoipa::path(
    put,
    path = "/api/classrooms/{id}",
    params(("id" = String, Path, description = "Classroom ID")),
    request_body = UpdateClassroomDto,
    responses(
        (status = 200, description = "Classroom updated", body = Classroom),
        (status = 404, description = "Classroom not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Classrooms"
)]
#[instrument(skip(state, dto))]
pub async fn update_classroom(
    State(state): State<AppState>,
    Path(id): Path<ClassroomId>,
    ValidatedJson(dto): ValidatedJson<UpdateClassroomDto>,
) -> Result<Json<Classroom>, AppError> {
    let classroom = ClassroomService::update_classroom(&state.db, id, dto).await?;
    Ok(Json(classroom))
}

#[utoipa::path(
    delete,
    path = "/api/classrooms/{id}",
    params(("id" = String, Path, description = "Classroom ID")),
    responses(
        (status = 200, description = "Classroom archived", body = Classroom),
        (status = 404, description = "Classroom not found", body = ErrorResponse)
    ),
    tag = "Classrooms"
)]
#[instrument(skip(state))]
pub async fn archive_classroom(
    State(state): State<AppState>,
    Path(id): Path<ClassroomId>,
) -> Result<Json<Classroom>, AppError> {
    let classroom = ClassroomService::archive_classroom(&state.db, id).await?;
    Ok(Json(classroom))
}
