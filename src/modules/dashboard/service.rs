use sqlx::PgPool;
use tracing::instrument;

use nanapatha_core::AppError;
use nanapatha_models::dashboard::{DashboardStats, RECENT_REGISTRATIONS_LIMIT};
use nanapatha_models::registrations::{REGISTRATION_COLUMNS, RegistrationRequest};

pub struct DashboardService;

impl DashboardService {
    #[instrument(skip(db))]
    pub async fn get_stats(db: &PgPool) -> Result<DashboardStats, AppError> {
        let (active_students, active_teachers) = sqlx::query_as::<_, (i64, i64)>(
            r#"SELECT COUNT(*) FILTER (WHERE role = 'student'),
                      COUNT(*) FILTER (WHERE role = 'teacher')
               FROM users
               WHERE status = 'active'"#,
        )
        .fetch_one(db)
        .await?;

        let pending_registrations = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM registration_requests WHERE status = 'pending'",
        )
        .fetch_one(db)
        .await?;

        let sql = format!(
            r#"SELECT {} FROM registration_requests
               WHERE status = 'pending'
               ORDER BY submitted_at DESC
               LIMIT $1"#,
            REGISTRATION_COLUMNS
        );
        let recent_registrations = sqlx::query_as::<_, RegistrationRequest>(&sql)
            .bind(RECENT_REGISTRATIONS_LIMIT)
            .fetch_all(db)
            .await?;

        Ok(DashboardStats {
            active_students,
            active_teachers,
            pending_registrations,
            recent_registrations,
        })
    }
}
