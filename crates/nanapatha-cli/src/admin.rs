//! Administrative maintenance tasks run from the command line.

use nanapatha_core::hash_password;
use nanapatha_models::UserId;
use sqlx::PgPool;

/// Creates an active admin account.
///
/// Admin accounts cannot be created through the HTTP API.
pub async fn create_admin(
    db: &PgPool,
    name: &str,
    email: &str,
    password: &str,
) -> Result<UserId, Box<dyn std::error::Error>> {
    let name = name.trim();
    let email = email.trim().to_lowercase();

    if name.is_empty() {
        return Err("Name is required".into());
    }
    if !email.contains('@') {
        return Err("A valid email address is required".into());
    }
    if password.len() < 8 {
        return Err("Password must be at least 8 characters".into());
    }

    let hashed_password =
        hash_password(password).map_err(|e| format!("Failed to hash password: {}", e.error))?;

    let user_id = sqlx::query_scalar::<_, UserId>(
        "INSERT INTO users (name, email, role, status, temp_password_hash)
         VALUES ($1, $2, 'admin', 'active', $3)
         ON CONFLICT (email) DO NOTHING
         RETURNING id",
    )
    .bind(name)
    .bind(&email)
    .bind(&hashed_password)
    .fetch_optional(db)
    .await?;

    user_id.ok_or_else(|| "User with this email already exists".into())
}

/// Recomputes every batch's enrollment counter from the student profiles.
///
/// Returns the number of batches whose counter changed.
pub async fn reconcile_enrollment(db: &PgPool) -> Result<u64, Box<dyn std::error::Error>> {
    let mut tx = db.begin().await?;
    let updated = crate::seeder::users::recount_enrollment(&mut tx).await?;
    tx.commit().await?;
    Ok(updated)
}
