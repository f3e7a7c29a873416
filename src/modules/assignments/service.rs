use anyhow::anyhow;
use sqlx::{PgConnection, PgPool};
use tracing::{info, instrument};

use nanapatha_core::AppError;
use nanapatha_models::ids::{BatchId, UserId};
use nanapatha_models::students::StudentBatchAssignment;
use nanapatha_models::teachers::TeacherBatchAssignment;
use nanapatha_models::{UserRole, UserStatus};

use crate::metrics::{track_batch_assignment, track_capacity_rejection};

/// Seat and teaching-slot bookkeeping for batches.
///
/// This is the only writer of `batches.current_enrollment` (apart from
/// [`AssignmentService::reconcile_enrollment`]). Every public operation runs
/// in a single transaction; the `*_in_tx` variants let other workflows
/// (accepting a registration, creating a student) place a student inside
/// their own transaction so that a full batch rolls everything back.
pub struct AssignmentService;

/// Batch row held under `FOR UPDATE` for the rest of the transaction.
#[derive(Debug, sqlx::FromRow)]
struct LockedBatch {
    id: BatchId,
    name: String,
    is_active: bool,
    teacher_id: Option<UserId>,
}

impl LockedBatch {
    fn find(locked: &[LockedBatch], id: BatchId) -> Result<&LockedBatch, AppError> {
        locked
            .iter()
            .find(|batch| batch.id == id)
            .ok_or_else(|| AppError::not_found(anyhow!("Batch not found")))
    }
}

impl AssignmentService {
    #[instrument(skip(db))]
    pub async fn assign_student_to_batch(
        db: &PgPool,
        student_id: UserId,
        batch_id: Option<BatchId>,
    ) -> Result<StudentBatchAssignment, AppError> {
        let mut tx = db.begin().await?;
        let assignment = Self::assign_student_in_tx(&mut tx, student_id, batch_id).await?;
        tx.commit().await?;

        Ok(assignment)
    }

    /// Moves a student into `batch_id`, or out of any batch when `None`.
    ///
    /// The seat is taken with a conditional increment, so two concurrent
    /// assignments can never push a batch past its capacity. The previous
    /// batch, if any, is decremented without going below zero.
    #[instrument(skip(conn))]
    pub async fn assign_student_in_tx(
        conn: &mut PgConnection,
        student_id: UserId,
        batch_id: Option<BatchId>,
    ) -> Result<StudentBatchAssignment, AppError> {
        let previous_batch_id = sqlx::query_scalar::<_, Option<BatchId>>(
            r#"SELECT sp.batch_id
               FROM student_profiles sp
               JOIN users u ON u.id = sp.user_id
               WHERE sp.user_id = $1 AND u.role = $2
               FOR UPDATE OF sp"#,
        )
        .bind(student_id)
        .bind(UserRole::Student)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Student not found")))?;

        if previous_batch_id == batch_id {
            return Ok(StudentBatchAssignment {
                student_id,
                previous_batch_id,
                batch_id,
            });
        }

        let touched: Vec<BatchId> = batch_id.into_iter().chain(previous_batch_id).collect();
        let locked = Self::lock_batches(conn, &touched).await?;

        if let Some(target) = batch_id {
            Self::take_seat(conn, LockedBatch::find(&locked, target)?).await?;
        }

        if let Some(previous) = previous_batch_id {
            Self::release_seat(conn, previous).await?;
        }

        sqlx::query(
            "UPDATE student_profiles SET batch_id = $2, updated_at = NOW() WHERE user_id = $1",
        )
        .bind(student_id)
        .bind(batch_id)
        .execute(&mut *conn)
        .await?;

        track_batch_assignment(if batch_id.is_some() {
            "student_assigned"
        } else {
            "student_unassigned"
        });
        info!(
            student_id = %student_id,
            ?previous_batch_id,
            ?batch_id,
            "Student batch assignment changed"
        );

        Ok(StudentBatchAssignment {
            student_id,
            previous_batch_id,
            batch_id,
        })
    }

    /// Locks every batch an operation is about to touch, always in id order.
    ///
    /// Two moves between the same pair of batches in opposite directions
    /// then wait on each other instead of deadlocking.
    async fn lock_batches(
        conn: &mut PgConnection,
        batch_ids: &[BatchId],
    ) -> Result<Vec<LockedBatch>, AppError> {
        if batch_ids.is_empty() {
            return Ok(Vec::new());
        }

        let locked = sqlx::query_as::<_, LockedBatch>(
            r#"SELECT id, name, is_active, teacher_id
               FROM batches
               WHERE id = ANY($1)
               ORDER BY id
               FOR UPDATE"#,
        )
        .bind(batch_ids)
        .fetch_all(&mut *conn)
        .await?;

        Ok(locked)
    }

    /// Claims one seat in an active batch or fails with a capacity error.
    async fn take_seat(conn: &mut PgConnection, batch: &LockedBatch) -> Result<(), AppError> {
        if !batch.is_active {
            return Err(AppError::bad_request(anyhow!(
                "Batch '{}' is archived and cannot take students",
                batch.name
            )));
        }

        let seated = sqlx::query_scalar::<_, i32>(
            r#"UPDATE batches
               SET current_enrollment = current_enrollment + 1, updated_at = NOW()
               WHERE id = $1 AND current_enrollment < capacity
               RETURNING current_enrollment"#,
        )
        .bind(batch.id)
        .fetch_optional(&mut *conn)
        .await?;

        if seated.is_none() {
            track_capacity_rejection();
            return Err(AppError::capacity(anyhow!("Batch '{}' is full", batch.name)));
        }

        Ok(())
    }

    async fn release_seat(conn: &mut PgConnection, batch_id: BatchId) -> Result<(), AppError> {
        sqlx::query(
            r#"UPDATE batches
               SET current_enrollment = GREATEST(current_enrollment - 1, 0), updated_at = NOW()
               WHERE id = $1"#,
        )
        .bind(batch_id)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn assign_teacher_to_batch(
        db: &PgPool,
        teacher_id: UserId,
        batch_id: Option<BatchId>,
    ) -> Result<TeacherBatchAssignment, AppError> {
        let mut tx = db.begin().await?;
        let assignment = Self::assign_teacher_in_tx(&mut tx, teacher_id, batch_id).await?;
        tx.commit().await?;

        Ok(assignment)
    }

    /// Gives `teacher_id` the teaching slot of `batch_id`, or frees the
    /// teacher from their batch when `None`.
    ///
    /// A teacher holds at most one batch: any batch they currently teach is
    /// cleared first, and whoever taught the target batch is replaced.
    #[instrument(skip(conn))]
    pub async fn assign_teacher_in_tx(
        conn: &mut PgConnection,
        teacher_id: UserId,
        batch_id: Option<BatchId>,
    ) -> Result<TeacherBatchAssignment, AppError> {
        let (status, active_flag) = sqlx::query_as::<_, (UserStatus, Option<bool>)>(
            r#"SELECT u.status, tp.active_flag
               FROM users u
               LEFT JOIN teacher_profiles tp ON tp.user_id = u.id
               WHERE u.id = $1 AND u.role = $2
               FOR NO KEY UPDATE OF u"#,
        )
        .bind(teacher_id)
        .bind(UserRole::Teacher)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Teacher not found")))?;

        // The teacher row lock keeps this teacher from being placed elsewhere
        // meanwhile, but another assignment may still replace them.
        let held_batch_id = sqlx::query_scalar::<_, BatchId>(
            "SELECT id FROM batches WHERE teacher_id = $1",
        )
        .bind(teacher_id)
        .fetch_optional(&mut *conn)
        .await?;

        let touched: Vec<BatchId> = held_batch_id.into_iter().chain(batch_id).collect();
        let locked = Self::lock_batches(conn, &touched).await?;
        let previous_batch_id = locked
            .iter()
            .find(|batch| batch.teacher_id == Some(teacher_id))
            .map(|batch| batch.id);

        let Some(target) = batch_id else {
            if let Some(previous) = previous_batch_id {
                sqlx::query(
                    "UPDATE batches SET teacher_id = NULL, updated_at = NOW() WHERE id = $1",
                )
                .bind(previous)
                .execute(&mut *conn)
                .await?;
                track_batch_assignment("teacher_unassigned");
                info!(teacher_id = %teacher_id, batch_id = %previous, "Teacher unassigned from batch");
            }

            return Ok(TeacherBatchAssignment {
                teacher_id,
                previous_batch_id,
                batch_id: None,
                replaced_teacher_id: None,
            });
        };

        if status != UserStatus::Active || active_flag == Some(false) {
            return Err(AppError::bad_request(anyhow!(
                "Only active teachers can be assigned to a batch"
            )));
        }

        let current_holder = LockedBatch::find(&locked, target)?.teacher_id;

        if previous_batch_id == Some(target) {
            return Ok(TeacherBatchAssignment {
                teacher_id,
                previous_batch_id,
                batch_id,
                replaced_teacher_id: None,
            });
        }

        if let Some(previous) = previous_batch_id {
            sqlx::query("UPDATE batches SET teacher_id = NULL, updated_at = NOW() WHERE id = $1")
                .bind(previous)
                .execute(&mut *conn)
                .await?;
        }

        sqlx::query("UPDATE batches SET teacher_id = $2, updated_at = NOW() WHERE id = $1")
            .bind(target)
            .bind(teacher_id)
            .execute(&mut *conn)
            .await?;

        track_batch_assignment("teacher_assigned");
        info!(
            teacher_id = %teacher_id,
            batch_id = %target,
            ?previous_batch_id,
            replaced_teacher_id = ?current_holder,
            "Teacher assigned to batch"
        );

        Ok(TeacherBatchAssignment {
            teacher_id,
            previous_batch_id,
            batch_id,
            replaced_teacher_id: current_holder,
        })
    }

    /// Recomputes every batch counter from the student profiles.
    ///
    /// Repairs drift introduced outside the assignment operations. A batch
    /// whose roster outgrew its capacity gets its capacity raised to match.
    #[instrument(skip(db))]
    pub async fn reconcile_enrollment(db: &PgPool) -> Result<u64, AppError> {
        let corrected = sqlx::query(
            r#"UPDATE batches b
               SET current_enrollment = counts.enrolled,
                   capacity = GREATEST(b.capacity, counts.enrolled),
                   updated_at = NOW()
               FROM (
                   SELECT b2.id, COUNT(sp.id)::INTEGER AS enrolled
                   FROM batches b2
                   LEFT JOIN student_profiles sp ON sp.batch_id = b2.id
                   GROUP BY b2.id
               ) counts
               WHERE b.id = counts.id AND b.current_enrollment <> counts.enrolled"#,
        )
        .execute(db)
        .await?
        .rows_affected();

        info!(corrected, "Batch enrollment reconciled");

        Ok(corrected)
    }
}
