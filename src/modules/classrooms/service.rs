use anyhow::anyhow;
use sqlx::PgPool;
use tracing::{info, instrument};

use nanapatha_core::{AppError, PaginationMeta};
use nanapatha_models::ids::ClassroomId;

use crate::modules::classrooms::model::{
    CLASSROOM_COLUMNS, Classroom, ClassroomFilterParams, CreateClassroomDto,
    PaginatedClassroomsResponse, UpdateClassroomDto,
};

const CLASSROOM_FILTER: &str = r#"WHERE ($1::text IS NULL OR name ILIKE $1 OR location ILIKE $1)
  AND ($2::boolean IS NULL OR is_active = $2)"#;

pub struct ClassroomService;

impl ClassroomService {
    #[instrument(skip(db))]
    pub async fn get_classrooms(
        db: &PgPool,
        filters: ClassroomFilterParams,
    ) -> Result<PaginatedClassroomsResponse, AppError> {
        let search = filters.search.as_ref().map(|s| format!("%{}%", s));

        let count_sql = format!("SELECT COUNT(*) FROM classrooms {}", CLASSROOM_FILTER);
        let total = sqlx::query_scalar::<_, i64>(&count_sql)
            .bind(&search)
            .bind(filters.is_active)
            .fetch_one(db)
            .await?;

        let data_sql = format!(
            "SELECT {} FROM classrooms {} ORDER BY name LIMIT $3 OFFSET $4",
            CLASSROOM_COLUMNS, CLASSROOM_FILTER
        );
        let classrooms = sqlx::query_as::<_, Classroom>(&data_sql)
            .bind(&search)
            .bind(filters.is_active)
            .bind(filters.pagination.limit())
            .bind(filters.pagination.offset())
            .fetch_all(db)
            .await?;

        Ok(PaginatedClassroomsResponse {
            data: classrooms,
            meta: PaginationMeta::new(total, &filters.pagination),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_classroom(db: &PgPool, id: ClassroomId) -> Result<Classroom, AppError> {
        let sql = format!("SELECT {} FROM classrooms WHERE id = $1", CLASSROOM_COLUMNS);
        sqlx::query_as::<_, Classroom>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Classroom not found")))
    }

    #[instrument(skip(db, dto))]
    pub async fn create_classroom(
        db: &PgPool,
        dto: CreateClassroomDto,
    ) -> Result<Classroom, AppError> {
        let sql = format!(
            r#"INSERT INTO classrooms (name, capacity, location, notes)
               VALUES ($1, $2, $3, $4)
               RETURNING {}"#,
            CLASSROOM_COLUMNS
        );
        let classroom = sqlx::query_as::<_, Classroom>(&sql)
            .bind(&dto.name)
            .bind(dto.capacity)
            .bind(&dto.location)
            .bind(&dto.notes)
            .fetch_one(db)
            .await?;

        info!(classroom_id = %classroom.id, name = %classroom.name, "Classroom created");

        Ok(classroom)
    }

    #[instrument(skip(db, dto))]
    pub async fn update_classroom(
        db: &PgPool,
        id: ClassroomId,
        dto: UpdateClassroomDto,
    ) -> Result<Classroom, AppError> {
        let sql = format!(
            r#"UPDATE classrooms
               SET name = COALESCE($2, name),
                   capacity = COALESCE($3, capacity),
                   location = COALESCE($4, location),
                   notes = COALESCE($5, notes),
                   is_active = COALESCE($6, is_active),
                   updated_at = NOW()
               WHERE id = $1
               RETURNING {}"#,
            CLASSROOM_COLUMNS
        );
        sqlx::query_as::<_, Classroom>(&sql)
            .bind(id)
            .bind(&dto.name)
            .bind(dto.capacity)
            .bind(&dto.location)
            .bind(&dto.notes)
            .bind(dto.is_active)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Classroom not found")))
    }

    #[instrument(skip(db))]
    pub async fn archive_classroom(db: &PgPool, id: ClassroomId) -> Result<Classroom, AppError> {
        let classroom = Self::update_classroom(
            db,
            id,
            UpdateClassroomDto {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await?;

        info!(classroom_id = %id, "Classroom archived");

        Ok(classroom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nanapatha_core::{ErrorKind, PaginationParams};

    fn room(name: &str, location: &str) -> CreateClassroomDto {
        CreateClassroomDto {
            name: name.into(),
            capacity: 40,
            location: Some(location.into()),
            notes: None,
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_search_matches_name_or_location(pool: PgPool) {
        ClassroomService::create_classroom(&pool, room("Room A-101", "Main Building, Floor 1"))
            .await
            .unwrap();
        let lab = ClassroomService::create_classroom(&pool, room("Science Lab", "Annex"))
            .await
            .unwrap();
        ClassroomService::archive_classroom(&pool, lab.id).await.unwrap();

        let filters = |search: &str, is_active| ClassroomFilterParams {
            search: Some(search.into()),
            is_active,
            pagination: PaginationParams::default(),
        };

        let by_location = ClassroomService::get_classrooms(&pool, filters("main building", None))
            .await
            .unwrap();
        assert_eq!(by_location.meta.total, 1);
        assert_eq!(by_location.data[0].name, "Room A-101");

        let active_labs = ClassroomService::get_classrooms(&pool, filters("lab", Some(true)))
            .await
            .unwrap();
        assert_eq!(active_labs.meta.total, 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_update_unknown_classroom(pool: PgPool) {
        let err = ClassroomService::update_classroom(
            &pool,
            ClassroomId::new(),
            UpdateClassroomDto::default(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
