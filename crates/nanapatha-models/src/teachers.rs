//! Teacher models and DTOs.

use chrono::{DateTime, Utc};
use nanapatha_core::{
    PaginationMeta, PaginationParams,
    serde::{empty_string_as_none, trimmed_string},
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::batches::Batch;
use crate::enums::UserStatus;
use crate::ids::{BatchId, TeacherProfileId, UserId};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TeacherProfile {
    pub id: TeacherProfileId,
    pub user_id: UserId,
    /// Ordered list of subjects taught
    pub subjects: Vec<String>,
    pub contact_number: Option<String>,
    pub bio: Option<String>,
    pub active_flag: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A teacher user joined with profile and current batch.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Teacher {
    /// User id
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub profile_id: Option<TeacherProfileId>,
    pub subjects: Option<Vec<String>>,
    pub contact_number: Option<String>,
    pub bio: Option<String>,
    pub active_flag: Option<bool>,
    pub batch_id: Option<BatchId>,
    pub batch_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateTeacherDto {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 7, max = 20))]
    pub phone: Option<String>,
    #[serde(default)]
    pub subjects: Vec<String>,
    #[validate(length(max = 20))]
    pub contact_number: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateTeacherDto {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 7, max = 20))]
    pub phone: Option<String>,
    pub subjects: Option<Vec<String>>,
    #[validate(length(max = 20))]
    pub contact_number: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TeacherFilterParams {
    /// Case-insensitive match on name or email
    #[serde(default, deserialize_with = "trimmed_string")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub status: Option<UserStatus>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedTeachersResponse {
    pub data: Vec<Teacher>,
    pub meta: PaginationMeta,
}

/// Outcome of assigning a teacher to a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TeacherBatchAssignment {
    pub teacher_id: UserId,
    /// Batch the teacher was taken off, if any
    pub previous_batch_id: Option<BatchId>,
    pub batch_id: Option<BatchId>,
    /// Teacher evicted from the target batch, if any
    pub replaced_teacher_id: Option<UserId>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TeachingLoad {
    pub teacher: Teacher,
    pub batches: Vec<Batch>,
    pub total_batches: i64,
    pub total_students: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TeacherPerformance {
    pub teacher_id: UserId,
    pub batches: Vec<Batch>,
    pub total_students: i64,
    pub total_sessions: i64,
    pub completed_sessions: i64,
}

/// A freshly provisioned account. The temporary password is only ever
/// returned here.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreatedTeacher {
    #[serde(flatten)]
    pub teacher: Teacher,
    pub temporary_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_teacher_defaults_subjects() {
        let dto: CreateTeacherDto = serde_json::from_str(
            r#"{"name":"Mr. Kamal Perera","email":"kamal.perera@nanapatha.lk"}"#,
        )
        .unwrap();
        assert!(dto.subjects.is_empty());
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_update_teacher_rejects_bad_email() {
        let dto = UpdateTeacherDto {
            email: Some("kamal".into()),
            ..Default::default()
        };
        assert!(dto.validate().is_err());
    }
}
