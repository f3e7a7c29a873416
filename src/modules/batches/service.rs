use anyhow::anyhow;
use sqlx::{PgExecutor, PgPool};
use tracing::{info, instrument};

use nanapatha_core::{AppError, PaginationMeta};
use nanapatha_models::ids::{BatchId, UserId};
use nanapatha_models::students::StudentBatchAssignment;

use crate::modules::assignments::AssignmentService;
use crate::modules::batches::model::{
    BATCH_COLUMNS, Batch, BatchDetail, BatchFilterParams, BatchRoster, BatchSummary,
    CreateBatchDto, PaginatedBatchesResponse, RosterEntry, UpdateBatchDto,
};

const BATCH_FILTER: &str = r#"WHERE ($1::text IS NULL OR b.name ILIKE $1)
  AND ($2::text IS NULL OR b.subject = $2)
  AND ($3::text IS NULL OR b.grade = $3)
  AND ($4::boolean IS NULL OR b.is_active = $4)"#;

const ROSTER_SELECT: &str = r#"SELECT u.id AS user_id, u.name, u.email, sp.student_id_number, sp.grade
FROM student_profiles sp
JOIN users u ON u.id = sp.user_id"#;

pub struct BatchService;

impl BatchService {
    fn summary_select() -> String {
        format!(
            "SELECT {}, t.name AS teacher_name FROM batches b LEFT JOIN users t ON t.id = b.teacher_id",
            BATCH_COLUMNS
        )
    }

    #[instrument(skip(db))]
    pub async fn get_batches(
        db: &PgPool,
        filters: BatchFilterParams,
    ) -> Result<PaginatedBatchesResponse, AppError> {
        let search = filters.search.as_ref().map(|s| format!("%{}%", s));

        let count_sql = format!("SELECT COUNT(*) FROM batches b {}", BATCH_FILTER);
        let total = sqlx::query_scalar::<_, i64>(&count_sql)
            .bind(&search)
            .bind(&filters.subject)
            .bind(&filters.grade)
            .bind(filters.is_active)
            .fetch_one(db)
            .await?;

        let data_sql = format!(
            "{} {} ORDER BY b.is_active DESC, b.name ASC LIMIT $5 OFFSET $6",
            Self::summary_select(),
            BATCH_FILTER
        );
        let batches = sqlx::query_as::<_, BatchSummary>(&data_sql)
            .bind(&search)
            .bind(&filters.subject)
            .bind(&filters.grade)
            .bind(filters.is_active)
            .bind(filters.pagination.limit())
            .bind(filters.pagination.offset())
            .fetch_all(db)
            .await?;

        Ok(PaginatedBatchesResponse {
            data: batches,
            meta: PaginationMeta::new(total, &filters.pagination),
        })
    }

    async fn find_summary<'e, E>(executor: E, id: BatchId) -> Result<BatchSummary, AppError>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!("{} WHERE b.id = $1", Self::summary_select());
        sqlx::query_as::<_, BatchSummary>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Batch not found")))
    }

    #[instrument(skip(db))]
    pub async fn get_batch(db: &PgPool, id: BatchId) -> Result<BatchDetail, AppError> {
        let batch = Self::find_summary(db, id).await?;
        let students = Self::current_students(db, id).await?;

        Ok(BatchDetail { batch, students })
    }

    async fn current_students(db: &PgPool, id: BatchId) -> Result<Vec<RosterEntry>, AppError> {
        let sql = format!("{} WHERE sp.batch_id = $1 ORDER BY u.name", ROSTER_SELECT);
        let students = sqlx::query_as::<_, RosterEntry>(&sql)
            .bind(id)
            .fetch_all(db)
            .await?;

        Ok(students)
    }

    /// Current students plus the active students who have no batch yet.
    #[instrument(skip(db))]
    pub async fn get_roster(db: &PgPool, id: BatchId) -> Result<BatchRoster, AppError> {
        let batch = Self::find_summary(db, id).await?;
        let current_students = Self::current_students(db, id).await?;

        let sql = format!(
            "{} WHERE sp.batch_id IS NULL AND u.role = 'student' AND u.status = 'active' ORDER BY u.name",
            ROSTER_SELECT
        );
        let available_students = sqlx::query_as::<_, RosterEntry>(&sql)
            .fetch_all(db)
            .await?;

        Ok(BatchRoster {
            batch,
            current_students,
            available_students,
        })
    }

    #[instrument(skip(db, dto))]
    pub async fn create_batch(db: &PgPool, dto: CreateBatchDto) -> Result<BatchSummary, AppError> {
        let mut tx = db.begin().await?;

        let id = sqlx::query_scalar::<_, BatchId>(
            r#"INSERT INTO batches (name, grade, subject, capacity, class_type, start_date, end_date, notes)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               RETURNING id"#,
        )
        .bind(&dto.name)
        .bind(&dto.grade)
        .bind(&dto.subject)
        .bind(dto.capacity)
        .bind(dto.class_type)
        .bind(dto.start_date)
        .bind(dto.end_date)
        .bind(&dto.notes)
        .fetch_one(&mut *tx)
        .await?;

        if let Some(teacher_id) = dto.teacher_id {
            AssignmentService::assign_teacher_in_tx(&mut tx, teacher_id, Some(id)).await?;
        }

        let batch = Self::find_summary(&mut *tx, id).await?;
        tx.commit().await?;

        info!(batch_id = %id, name = %batch.batch.name, capacity = batch.batch.capacity, "Batch created");

        Ok(batch)
    }

    /// Updates batch details. The enrollment counter is never written here,
    /// and the capacity may not drop below the current enrollment.
    #[instrument(skip(db, dto))]
    pub async fn update_batch(
        db: &PgPool,
        id: BatchId,
        dto: UpdateBatchDto,
    ) -> Result<BatchSummary, AppError> {
        let mut tx = db.begin().await?;

        let sql = format!("SELECT {} FROM batches b WHERE b.id = $1 FOR UPDATE", BATCH_COLUMNS);
        let current = sqlx::query_as::<_, Batch>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Batch not found")))?;

        if let Some(capacity) = dto.capacity
            && capacity < current.current_enrollment
        {
            return Err(AppError::bad_request(anyhow!(
                "Capacity cannot be lower than the current enrollment of {}",
                current.current_enrollment
            )));
        }

        let start_date = dto.start_date.or(current.start_date);
        let end_date = dto.end_date.or(current.end_date);
        if let (Some(start), Some(end)) = (start_date, end_date)
            && start > end
        {
            return Err(AppError::bad_request(anyhow!(
                "start_date must not be after end_date"
            )));
        }

        sqlx::query(
            r#"UPDATE batches
               SET name = COALESCE($2, name),
                   grade = COALESCE($3, grade),
                   subject = COALESCE($4, subject),
                   capacity = COALESCE($5, capacity),
                   class_type = COALESCE($6, class_type),
                   start_date = $7,
                   end_date = $8,
                   notes = COALESCE($9, notes),
                   is_active = COALESCE($10, is_active),
                   updated_at = NOW()
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(&dto.name)
        .bind(&dto.grade)
        .bind(&dto.subject)
        .bind(dto.capacity)
        .bind(dto.class_type)
        .bind(start_date)
        .bind(end_date)
        .bind(&dto.notes)
        .bind(dto.is_active)
        .execute(&mut *tx)
        .await?;

        let batch = Self::find_summary(&mut *tx, id).await?;
        tx.commit().await?;

        Ok(batch)
    }

    /// Closes the batch to new students. Existing students keep their seats.
    #[instrument(skip(db))]
    pub async fn archive_batch(db: &PgPool, id: BatchId) -> Result<BatchSummary, AppError> {
        let updated = sqlx::query(
            "UPDATE batches SET is_active = FALSE, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(AppError::not_found(anyhow!("Batch not found")));
        }

        info!(batch_id = %id, "Batch archived");
        Self::find_summary(db, id).await
    }

    /// Seats a student who is not yet in any batch.
    #[instrument(skip(db))]
    pub async fn add_student(
        db: &PgPool,
        id: BatchId,
        student_id: UserId,
    ) -> Result<StudentBatchAssignment, AppError> {
        let mut tx = db.begin().await?;

        let current = sqlx::query_scalar::<_, Option<BatchId>>(
            "SELECT batch_id FROM student_profiles WHERE user_id = $1 FOR UPDATE",
        )
        .bind(student_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Student not found")))?;

        if current.is_some() {
            return Err(AppError::bad_request(anyhow!(
                "Student is already assigned to a batch"
            )));
        }

        let assignment = AssignmentService::assign_student_in_tx(&mut tx, student_id, Some(id)).await?;
        tx.commit().await?;

        Ok(assignment)
    }

    #[instrument(skip(db))]
    pub async fn remove_student(
        db: &PgPool,
        id: BatchId,
        student_id: UserId,
    ) -> Result<StudentBatchAssignment, AppError> {
        let mut tx = db.begin().await?;

        let current = sqlx::query_scalar::<_, Option<BatchId>>(
            "SELECT batch_id FROM student_profiles WHERE user_id = $1 FOR UPDATE",
        )
        .bind(student_id)
        .fetch_optional(&mut *tx)
        .await?
        .flatten();

        if current != Some(id) {
            return Err(AppError::not_found(anyhow!("Student is not in this batch")));
        }

        let assignment = AssignmentService::assign_student_in_tx(&mut tx, student_id, None).await?;
        tx.commit().await?;

        Ok(assignment)
    }

    /// Batch-side teacher assignment. `None` leaves the batch without a
    /// teacher.
    #[instrument(skip(db))]
    pub async fn set_teacher(
        db: &PgPool,
        id: BatchId,
        teacher_id: Option<UserId>,
    ) -> Result<BatchSummary, AppError> {
        let mut tx = db.begin().await?;

        match teacher_id {
            Some(teacher_id) => {
                AssignmentService::assign_teacher_in_tx(&mut tx, teacher_id, Some(id)).await?;
            }
            None => {
                let updated = sqlx::query(
                    "UPDATE batches SET teacher_id = NULL, updated_at = NOW() WHERE id = $1",
                )
                .bind(id)
                .execute(&mut *tx)
                .await?
                .rows_affected();

                if updated == 0 {
                    return Err(AppError::not_found(anyhow!("Batch not found")));
                }
            }
        }

        let batch = Self::find_summary(&mut *tx, id).await?;
        tx.commit().await?;

        Ok(batch)
    }
}
