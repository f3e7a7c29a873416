use anyhow::anyhow;
use sqlx::PgPool;
use tracing::{info, instrument};

use nanapatha_core::AppError;
use nanapatha_models::UserRole;
use nanapatha_models::ids::UserId;

use crate::modules::assignments::AssignmentService;
use crate::modules::users::model::{USER_COLUMNS, User};

pub struct UserService;

impl UserService {
    #[instrument(skip(db))]
    pub async fn get_user(db: &PgPool, id: UserId) -> Result<User, AppError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("User not found")))
    }

    /// Deletes the account and its profile. A student's seat is released
    /// first so the batch counter stays in step with the roster.
    #[instrument(skip(db))]
    pub async fn delete_user(db: &PgPool, id: UserId) -> Result<(), AppError> {
        let mut tx = db.begin().await?;

        let role = sqlx::query_scalar::<_, UserRole>("SELECT role FROM users WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("User not found")))?;

        if role == UserRole::Student {
            let has_profile = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM student_profiles WHERE user_id = $1)",
            )
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

            if has_profile {
                AssignmentService::assign_student_in_tx(&mut tx, id, None).await?;
            }
        }

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(user_id = %id, role = %role, "User deleted");

        Ok(())
    }
}
