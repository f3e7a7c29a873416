use anyhow::anyhow;
use sqlx::{PgExecutor, PgPool};
use tracing::{info, instrument};

use nanapatha_core::{AppError, PaginationMeta, generate_temporary_password, hash_password};
use nanapatha_models::batches::{BATCH_COLUMNS, Batch};
use nanapatha_models::ids::{BatchId, UserId};
use nanapatha_models::{SessionStatus, UserRole, UserStatus};

use crate::metrics::track_user_created;
use crate::modules::assignments::AssignmentService;
use crate::modules::teachers::model::{
    CreateTeacherDto, CreatedTeacher, PaginatedTeachersResponse, Teacher, TeacherBatchAssignment,
    TeacherFilterParams, TeacherPerformance, TeachingLoad, UpdateTeacherDto,
};

const TEACHER_SELECT: &str = r#"SELECT u.id, u.name, u.email, u.phone, u.status, u.created_at,
       tp.id AS profile_id, tp.subjects, tp.contact_number, tp.bio, tp.active_flag,
       b.id AS batch_id, b.name AS batch_name
FROM users u
LEFT JOIN teacher_profiles tp ON tp.user_id = u.id
LEFT JOIN batches b ON b.teacher_id = u.id"#;

const TEACHER_FILTER: &str = r#"WHERE u.role = 'teacher'
  AND ($1::user_status IS NULL OR u.status = $1)
  AND ($2::text IS NULL OR u.name ILIKE $2 OR u.email ILIKE $2)"#;

pub struct TeacherService;

impl TeacherService {
    #[instrument(skip(db))]
    pub async fn get_teachers(
        db: &PgPool,
        filters: TeacherFilterParams,
    ) -> Result<PaginatedTeachersResponse, AppError> {
        let search = filters.search.as_ref().map(|s| format!("%{}%", s));

        let count_sql = format!("SELECT COUNT(*) FROM users u {}", TEACHER_FILTER);
        let total = sqlx::query_scalar::<_, i64>(&count_sql)
            .bind(filters.status)
            .bind(&search)
            .fetch_one(db)
            .await?;

        let data_sql = format!(
            "{} {} ORDER BY u.name ASC, u.id LIMIT $3 OFFSET $4",
            TEACHER_SELECT, TEACHER_FILTER
        );
        let teachers = sqlx::query_as::<_, Teacher>(&data_sql)
            .bind(filters.status)
            .bind(&search)
            .bind(filters.pagination.limit())
            .bind(filters.pagination.offset())
            .fetch_all(db)
            .await?;

        Ok(PaginatedTeachersResponse {
            data: teachers,
            meta: PaginationMeta::new(total, &filters.pagination),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_teacher(db: &PgPool, id: UserId) -> Result<Teacher, AppError> {
        Self::find_teacher(db, id).await
    }

    async fn find_teacher<'e, E>(executor: E, id: UserId) -> Result<Teacher, AppError>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!("{} WHERE u.id = $1 AND u.role = 'teacher'", TEACHER_SELECT);
        sqlx::query_as::<_, Teacher>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Teacher not found")))
    }

    #[instrument(skip(db, dto), fields(email = %dto.email))]
    pub async fn create_teacher(
        db: &PgPool,
        dto: CreateTeacherDto,
    ) -> Result<CreatedTeacher, AppError> {
        let temporary_password = generate_temporary_password();
        let password_hash = hash_password(&temporary_password)?;

        let mut tx = db.begin().await?;

        let id = sqlx::query_scalar::<_, UserId>(
            r#"INSERT INTO users (name, email, phone, role, status, temp_password_hash)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING id"#,
        )
        .bind(&dto.name)
        .bind(&dto.email)
        .bind(&dto.phone)
        .bind(UserRole::Teacher)
        .bind(UserStatus::Active)
        .bind(&password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                return AppError::bad_request(anyhow!(
                    "A user with email {} already exists",
                    dto.email
                ));
            }
            AppError::from(e)
        })?;

        sqlx::query(
            r#"INSERT INTO teacher_profiles (user_id, subjects, contact_number, bio)
               VALUES ($1, $2, $3, $4)"#,
        )
        .bind(id)
        .bind(&dto.subjects)
        .bind(&dto.contact_number)
        .bind(&dto.bio)
        .execute(&mut *tx)
        .await?;

        let teacher = Self::find_teacher(&mut *tx, id).await?;
        tx.commit().await?;

        track_user_created("teacher");
        info!(teacher_id = %id, "Teacher created");

        Ok(CreatedTeacher {
            teacher,
            temporary_password,
        })
    }

    #[instrument(skip(db, dto))]
    pub async fn update_teacher(
        db: &PgPool,
        id: UserId,
        dto: UpdateTeacherDto,
    ) -> Result<Teacher, AppError> {
        let mut tx = db.begin().await?;

        let updated = sqlx::query(
            r#"UPDATE users
               SET name = COALESCE($2, name),
                   email = COALESCE($3, email),
                   phone = COALESCE($4, phone),
                   updated_at = NOW()
               WHERE id = $1 AND role = 'teacher'"#,
        )
        .bind(id)
        .bind(&dto.name)
        .bind(&dto.email)
        .bind(&dto.phone)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                return AppError::bad_request(anyhow!("A user with this email already exists"));
            }
            AppError::from(e)
        })?
        .rows_affected();

        if updated == 0 {
            return Err(AppError::not_found(anyhow!("Teacher not found")));
        }

        // Teachers created outside the API may lack a profile row
        sqlx::query(
            r#"INSERT INTO teacher_profiles (user_id, subjects, contact_number, bio)
               VALUES ($1, COALESCE($2::TEXT[], '{}'), $3, $4)
               ON CONFLICT (user_id) DO UPDATE
               SET subjects = COALESCE($2::TEXT[], teacher_profiles.subjects),
                   contact_number = COALESCE($3, teacher_profiles.contact_number),
                   bio = COALESCE($4, teacher_profiles.bio),
                   updated_at = NOW()"#,
        )
        .bind(id)
        .bind(&dto.subjects)
        .bind(&dto.contact_number)
        .bind(&dto.bio)
        .execute(&mut *tx)
        .await?;

        let teacher = Self::find_teacher(&mut *tx, id).await?;
        tx.commit().await?;

        Ok(teacher)
    }

    /// Marks the teacher inactive. They keep their batch until reassigned.
    #[instrument(skip(db))]
    pub async fn deactivate_teacher(db: &PgPool, id: UserId) -> Result<Teacher, AppError> {
        let mut tx = db.begin().await?;

        let updated = sqlx::query(
            "UPDATE users SET status = 'inactive', updated_at = NOW() WHERE id = $1 AND role = 'teacher'",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(AppError::not_found(anyhow!("Teacher not found")));
        }

        sqlx::query(
            "UPDATE teacher_profiles SET active_flag = FALSE, updated_at = NOW() WHERE user_id = $1",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let teacher = Self::find_teacher(&mut *tx, id).await?;
        tx.commit().await?;

        info!(teacher_id = %id, "Teacher deactivated");

        Ok(teacher)
    }

    #[instrument(skip(db))]
    pub async fn assign_batch(
        db: &PgPool,
        id: UserId,
        batch_id: Option<BatchId>,
    ) -> Result<TeacherBatchAssignment, AppError> {
        AssignmentService::assign_teacher_to_batch(db, id, batch_id).await
    }

    async fn taught_batches(db: &PgPool, id: UserId) -> Result<Vec<Batch>, AppError> {
        let sql = format!(
            "SELECT {} FROM batches b WHERE b.teacher_id = $1 ORDER BY b.name",
            BATCH_COLUMNS
        );
        let batches = sqlx::query_as::<_, Batch>(&sql)
            .bind(id)
            .fetch_all(db)
            .await?;

        Ok(batches)
    }

    fn student_total(batches: &[Batch]) -> i64 {
        batches
            .iter()
            .map(|b| i64::from(b.current_enrollment))
            .sum()
    }

    #[instrument(skip(db))]
    pub async fn teaching_load(db: &PgPool, id: UserId) -> Result<TeachingLoad, AppError> {
        let teacher = Self::find_teacher(db, id).await?;
        let batches = Self::taught_batches(db, id).await?;

        Ok(TeachingLoad {
            total_batches: batches.len() as i64,
            total_students: Self::student_total(&batches),
            teacher,
            batches,
        })
    }

    #[instrument(skip(db))]
    pub async fn performance(db: &PgPool, id: UserId) -> Result<TeacherPerformance, AppError> {
        Self::find_teacher(db, id).await?;
        let batches = Self::taught_batches(db, id).await?;

        let (total_sessions, completed_sessions) = sqlx::query_as::<_, (i64, i64)>(
            r#"SELECT COUNT(*), COUNT(*) FILTER (WHERE status = $2)
               FROM class_sessions
               WHERE teacher_id = $1"#,
        )
        .bind(id)
        .bind(SessionStatus::Completed)
        .fetch_one(db)
        .await?;

        Ok(TeacherPerformance {
            teacher_id: id,
            total_students: Self::student_total(&batches),
            batches,
            total_sessions,
            completed_sessions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nanapatha_core::{ErrorKind, PaginationParams};

    fn teacher_dto(name: &str, email: &str) -> CreateTeacherDto {
        CreateTeacherDto {
            name: name.into(),
            email: email.into(),
            phone: None,
            subjects: vec!["Physics".into(), "Combined Maths".into()],
            contact_number: None,
            bio: None,
        }
    }

    async fn insert_batch(pool: &PgPool, name: &str) -> BatchId {
        sqlx::query_scalar(
            "INSERT INTO batches (name, grade, subject, capacity, current_enrollment) VALUES ($1, 'A/L', 'Physics', 30, 12) RETURNING id",
        )
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_create_and_list_ordered_by_name(pool: PgPool) {
        TeacherService::create_teacher(&pool, teacher_dto("Rohan Wijesinghe", "rohan@test.com"))
            .await
            .unwrap();
        let created =
            TeacherService::create_teacher(&pool, teacher_dto("Anjali Gunawardena", "anjali@test.com"))
                .await
                .unwrap();
        assert_eq!(created.teacher.subjects.as_ref().unwrap().len(), 2);
        assert_eq!(created.teacher.active_flag, Some(true));

        let list = TeacherService::get_teachers(
            &pool,
            TeacherFilterParams {
                search: None,
                status: None,
                pagination: PaginationParams::default(),
            },
        )
        .await
        .unwrap();
        assert_eq!(list.meta.total, 2);
        assert_eq!(list.data[0].name, "Anjali Gunawardena");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_deactivated_teacher_cannot_take_a_batch(pool: PgPool) {
        let created = TeacherService::create_teacher(&pool, teacher_dto("T", "t@test.com"))
            .await
            .unwrap();
        let batch = insert_batch(&pool, "A/L Physics 2026 - Batch A").await;

        let teacher = TeacherService::deactivate_teacher(&pool, created.teacher.id)
            .await
            .unwrap();
        assert_eq!(teacher.status, UserStatus::Inactive);
        assert_eq!(teacher.active_flag, Some(false));

        let err = TeacherService::assign_batch(&pool, teacher.id, Some(batch))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_teaching_load_and_performance(pool: PgPool) {
        let created = TeacherService::create_teacher(&pool, teacher_dto("T", "t@test.com"))
            .await
            .unwrap();
        let id = created.teacher.id;
        let batch = insert_batch(&pool, "A/L Physics 2026 - Batch A").await;
        TeacherService::assign_batch(&pool, id, Some(batch)).await.unwrap();

        for status in ["completed", "completed", "scheduled"] {
            sqlx::query(
                r#"INSERT INTO class_sessions (batch_id, teacher_id, date, start_time, end_time, status)
                   VALUES ($1, $2, '2024-10-08', '09:00', '11:00', $3::session_status)"#,
            )
            .bind(batch)
            .bind(id)
            .bind(status)
            .execute(&pool)
            .await
            .unwrap();
        }

        let load = TeacherService::teaching_load(&pool, id).await.unwrap();
        assert_eq!(load.total_batches, 1);
        assert_eq!(load.total_students, 12);
        assert_eq!(load.teacher.batch_id, Some(batch));

        let performance = TeacherService::performance(&pool, id).await.unwrap();
        assert_eq!(performance.total_sessions, 3);
        assert_eq!(performance.completed_sessions, 2);

        let err = TeacherService::performance(&pool, UserId::new()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
