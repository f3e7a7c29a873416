//! User accounts.
//!
//! Every person in the system is a `users` row. Students and teachers carry
//! an additional profile row keyed by `user_id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::enums::{UserRole, UserStatus};
use crate::ids::UserId;

/// Column list matching [`User`], for `RETURNING` and `SELECT` clauses.
pub const USER_COLUMNS: &str =
    "id, name, email, phone, role, status, temp_password_hash, created_at, updated_at";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub status: UserStatus,
    /// bcrypt hash of the temporary credential; never leaves the server.
    #[serde(skip_serializing, default)]
    pub temp_password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
