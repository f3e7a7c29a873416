use anyhow::anyhow;
use chrono::{NaiveDate, NaiveTime};
use sqlx::PgPool;
use tracing::{info, instrument};

use nanapatha_core::{AppError, PaginationMeta};
use nanapatha_models::ids::{ClassSessionId, UserId};
use nanapatha_models::schedule::week_range;
use nanapatha_models::{SessionStatus, UserRole};

use crate::modules::schedule::model::{
    ClassSessionDetail, ClassSessionFilterParams, CreateClassSessionDto,
    PaginatedClassSessionsResponse, ScheduleView,
};

const SESSION_SELECT: &str = r#"SELECT s.id, s.batch_id, s.teacher_id, s.classroom_id, s.date,
       s.start_time, s.end_time, s.topic, s.status, s.created_at, s.updated_at,
       b.name AS batch_name, t.name AS teacher_name, c.name AS classroom_name
FROM class_sessions s
JOIN batches b ON b.id = s.batch_id
LEFT JOIN users t ON t.id = s.teacher_id
LEFT JOIN classrooms c ON c.id = s.classroom_id"#;

const SESSION_FILTER: &str = r#"WHERE ($1::uuid IS NULL OR s.batch_id = $1)
  AND ($2::uuid IS NULL OR s.teacher_id = $2)
  AND ($3::uuid IS NULL OR s.classroom_id = $3)
  AND ($4::date IS NULL OR s.date >= $4)
  AND ($5::date IS NULL OR s.date <= $5)
  AND ($6::session_status IS NULL OR s.status = $6)"#;

pub struct ScheduleService;

impl ScheduleService {
    /// Week, today, active and upcoming sessions around `date` and `time`.
    #[instrument(skip(db))]
    pub async fn schedule_view(
        db: &PgPool,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<ScheduleView, AppError> {
        let (week_start, week_end) = week_range(date);

        let sql = format!(
            "{} WHERE s.date BETWEEN $1 AND $2 ORDER BY s.date, s.start_time",
            SESSION_SELECT
        );
        let sessions = sqlx::query_as::<_, ClassSessionDetail>(&sql)
            .bind(week_start)
            .bind(week_end)
            .fetch_all(db)
            .await?;

        Ok(ScheduleView::project(date, time, sessions))
    }

    #[instrument(skip(db, dto))]
    pub async fn create_session(
        db: &PgPool,
        dto: CreateClassSessionDto,
    ) -> Result<ClassSessionDetail, AppError> {
        let batch_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM batches WHERE id = $1)")
                .bind(dto.batch_id)
                .fetch_one(db)
                .await?;
        if !batch_exists {
            return Err(AppError::not_found(anyhow!("Batch not found")));
        }

        if let Some(teacher_id) = dto.teacher_id {
            let role = sqlx::query_scalar::<_, UserRole>("SELECT role FROM users WHERE id = $1")
                .bind(teacher_id)
                .fetch_optional(db)
                .await?
                .ok_or_else(|| AppError::not_found(anyhow!("Teacher not found")))?;
            if role != UserRole::Teacher {
                return Err(AppError::bad_request(anyhow!(
                    "Sessions can only be taught by a teacher"
                )));
            }
        }

        if let Some(classroom_id) = dto.classroom_id {
            let classroom_exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM classrooms WHERE id = $1)",
            )
            .bind(classroom_id)
            .fetch_one(db)
            .await?;
            if !classroom_exists {
                return Err(AppError::not_found(anyhow!("Classroom not found")));
            }
        }

        let id = sqlx::query_scalar::<_, ClassSessionId>(
            r#"INSERT INTO class_sessions
                   (batch_id, teacher_id, classroom_id, date, start_time, end_time, topic, status)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               RETURNING id"#,
        )
        .bind(dto.batch_id)
        .bind(dto.teacher_id)
        .bind(dto.classroom_id)
        .bind(dto.date)
        .bind(dto.start_time)
        .bind(dto.end_time)
        .bind(&dto.topic)
        .bind(SessionStatus::Scheduled)
        .fetch_one(db)
        .await?;

        info!(session_id = %id, batch_id = %dto.batch_id, date = %dto.date, "Class session scheduled");

        Self::get_session(db, id).await
    }

    #[instrument(skip(db))]
    pub async fn get_session(
        db: &PgPool,
        id: ClassSessionId,
    ) -> Result<ClassSessionDetail, AppError> {
        let sql = format!("{} WHERE s.id = $1", SESSION_SELECT);
        sqlx::query_as::<_, ClassSessionDetail>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Class session not found")))
    }

    #[instrument(skip(db))]
    pub async fn list_sessions(
        db: &PgPool,
        filters: ClassSessionFilterParams,
    ) -> Result<PaginatedClassSessionsResponse, AppError> {
        let count_sql = format!("SELECT COUNT(*) FROM class_sessions s {}", SESSION_FILTER);
        let total = sqlx::query_scalar::<_, i64>(&count_sql)
            .bind(filters.batch_id)
            .bind(filters.teacher_id)
            .bind(filters.classroom_id)
            .bind(filters.date_from)
            .bind(filters.date_to)
            .bind(filters.status)
            .fetch_one(db)
            .await?;

        let data_sql = format!(
            "{} {} ORDER BY s.date, s.start_time LIMIT $7 OFFSET $8",
            SESSION_SELECT, SESSION_FILTER
        );
        let sessions = sqlx::query_as::<_, ClassSessionDetail>(&data_sql)
            .bind(filters.batch_id)
            .bind(filters.teacher_id)
            .bind(filters.classroom_id)
            .bind(filters.date_from)
            .bind(filters.date_to)
            .bind(filters.status)
            .bind(filters.pagination.limit())
            .bind(filters.pagination.offset())
            .fetch_all(db)
            .await?;

        Ok(PaginatedClassSessionsResponse {
            data: sessions,
            meta: PaginationMeta::new(total, &filters.pagination),
        })
    }

    pub async fn teacher_sessions(
        db: &PgPool,
        teacher_id: UserId,
    ) -> Result<Vec<ClassSessionDetail>, AppError> {
        let sql = format!(
            "{} WHERE s.teacher_id = $1 ORDER BY s.date, s.start_time",
            SESSION_SELECT
        );
        let sessions = sqlx::query_as::<_, ClassSessionDetail>(&sql)
            .bind(teacher_id)
            .fetch_all(db)
            .await?;

        Ok(sessions)
    }

    /// Completes or cancels a scheduled session. Both outcomes are final.
    #[instrument(skip(db))]
    pub async fn update_session_status(
        db: &PgPool,
        id: ClassSessionId,
        status: SessionStatus,
    ) -> Result<ClassSessionDetail, AppError> {
        let mut tx = db.begin().await?;

        let current = sqlx::query_scalar::<_, SessionStatus>(
            "SELECT status FROM class_sessions WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Class session not found")))?;

        if !current.can_transition_to(status) {
            return Err(AppError::invalid_state(anyhow!(
                "Cannot move a {} session to {}",
                current,
                status
            )));
        }

        sqlx::query("UPDATE class_sessions SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(session_id = %id, from = %current, to = %status, "Class session status changed");

        Self::get_session(db, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nanapatha_core::{ErrorKind, PaginationParams};
    use nanapatha_models::ids::BatchId;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    async fn insert_batch(pool: &PgPool) -> BatchId {
        sqlx::query_scalar(
            "INSERT INTO batches (name, grade, subject, capacity) VALUES ('Grade 10 Science', 'Grade 10', 'Science', 20) RETURNING id",
        )
        .fetch_one(pool)
        .await
        .unwrap()
    }

    fn session_dto(batch_id: BatchId, on: NaiveDate, start: u32, end: u32) -> CreateClassSessionDto {
        CreateClassSessionDto {
            batch_id,
            teacher_id: None,
            classroom_id: None,
            date: on,
            start_time: time(start, 0),
            end_time: time(end, 0),
            topic: Some("Motion".into()),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_schedule_view_for_2024_10_10(pool: PgPool) {
        let batch = insert_batch(&pool).await;
        for (on, start, end) in [
            (date(2024, 10, 8), 9, 11),
            (date(2024, 10, 13), 14, 16),
            (date(2024, 10, 10), 8, 10),
            (date(2024, 10, 10), 13, 15),
            (date(2024, 10, 14), 9, 11),
            (date(2024, 10, 6), 9, 11),
        ] {
            ScheduleService::create_session(&pool, session_dto(batch, on, start, end))
                .await
                .unwrap();
        }

        let view = ScheduleService::schedule_view(&pool, date(2024, 10, 10), time(9, 30))
            .await
            .unwrap();

        assert_eq!(view.week_start, date(2024, 10, 7));
        assert_eq!(view.week_end, date(2024, 10, 13));
        assert_eq!(view.week_sessions.len(), 4);
        assert_eq!(view.today_sessions.len(), 2);
        assert_eq!(view.active_sessions.len(), 1);
        assert_eq!(view.active_sessions[0].session.start_time, time(8, 0));
        assert_eq!(view.upcoming_sessions.len(), 1);
        assert_eq!(view.upcoming_sessions[0].batch_name, "Grade 10 Science");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_create_session_checks_references(pool: PgPool) {
        let batch = insert_batch(&pool).await;

        let err = ScheduleService::create_session(
            &pool,
            session_dto(BatchId::new(), date(2024, 10, 8), 9, 11),
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);

        let student: UserId = sqlx::query_scalar(
            "INSERT INTO users (name, email, role) VALUES ('S', 's@test.com', 'student') RETURNING id",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        let err = ScheduleService::create_session(
            &pool,
            CreateClassSessionDto {
                teacher_id: Some(student),
                ..session_dto(batch, date(2024, 10, 8), 9, 11)
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_status_transitions_are_final(pool: PgPool) {
        let batch = insert_batch(&pool).await;
        let session =
            ScheduleService::create_session(&pool, session_dto(batch, date(2024, 10, 8), 9, 11))
                .await
                .unwrap();
        assert_eq!(session.session.status, SessionStatus::Scheduled);

        let done = ScheduleService::update_session_status(
            &pool,
            session.session.id,
            SessionStatus::Completed,
        )
        .await
        .unwrap();
        assert_eq!(done.session.status, SessionStatus::Completed);

        let err = ScheduleService::update_session_status(
            &pool,
            session.session.id,
            SessionStatus::Cancelled,
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidState);

        let listed = ScheduleService::list_sessions(
            &pool,
            ClassSessionFilterParams {
                batch_id: Some(batch),
                teacher_id: None,
                classroom_id: None,
                date_from: Some(date(2024, 10, 7)),
                date_to: Some(date(2024, 10, 13)),
                status: Some(SessionStatus::Completed),
                pagination: PaginationParams::default(),
            },
        )
        .await
        .unwrap();
        assert_eq!(listed.meta.total, 1);
    }
}
