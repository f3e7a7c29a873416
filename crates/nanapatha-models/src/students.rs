//! Student models and DTOs.
//!
//! A student is a `users` row with role `student` plus a `student_profiles`
//! row. Endpoints address students by their user id.

use chrono::{DateTime, NaiveDate, Utc};
use nanapatha_core::{
    PaginationMeta, PaginationParams,
    serde::{empty_string_as_none, trimmed_string},
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::enums::{ClassType, UserStatus};
use crate::ids::{BatchId, StudentProfileId, UserId};

pub const STUDENT_PROFILE_COLUMNS: &str = "id, user_id, dob, grade, address, contact_number, \
     class_type, batch_id, student_id_number, passport_photo_path, student_id_card_path, \
     created_at, updated_at";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct StudentProfile {
    pub id: StudentProfileId,
    pub user_id: UserId,
    pub dob: Option<NaiveDate>,
    pub grade: Option<String>,
    pub address: Option<String>,
    pub contact_number: Option<String>,
    pub class_type: Option<ClassType>,
    pub batch_id: Option<BatchId>,
    /// Institute number, e.g. "NP2024001" or a generated "STU000042"
    pub student_id_number: String,
    pub passport_photo_path: Option<String>,
    pub student_id_card_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A student user joined with profile and batch name.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Student {
    /// User id
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub profile_id: StudentProfileId,
    pub student_id_number: String,
    pub dob: Option<NaiveDate>,
    pub grade: Option<String>,
    pub address: Option<String>,
    pub contact_number: Option<String>,
    pub class_type: Option<ClassType>,
    pub batch_id: Option<BatchId>,
    pub batch_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateStudentDto {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 7, max = 20))]
    pub phone: Option<String>,
    /// Generated as `STU` plus six digits when omitted
    #[validate(length(min = 1, max = 50))]
    pub student_id_number: Option<String>,
    pub dob: Option<NaiveDate>,
    #[validate(length(max = 20))]
    pub grade: Option<String>,
    pub address: Option<String>,
    #[validate(length(max = 20))]
    pub contact_number: Option<String>,
    pub class_type: Option<ClassType>,
    /// Seat the student in this batch; fails when the batch is full
    pub batch_id: Option<BatchId>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateStudentDto {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 7, max = 20))]
    pub phone: Option<String>,
    pub status: Option<UserStatus>,
    pub dob: Option<NaiveDate>,
    #[validate(length(max = 20))]
    pub grade: Option<String>,
    pub address: Option<String>,
    #[validate(length(max = 20))]
    pub contact_number: Option<String>,
    pub class_type: Option<ClassType>,
    /// Move the student to this batch. Use the assignment endpoint to unassign.
    pub batch_id: Option<BatchId>,
}

#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StudentFilterParams {
    /// Case-insensitive match on name or email
    #[serde(default, deserialize_with = "trimmed_string")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub status: Option<UserStatus>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub batch_id: Option<BatchId>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedStudentsResponse {
    pub data: Vec<Student>,
    pub meta: PaginationMeta,
}

/// Body of the batch assignment endpoints for students and teachers.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AssignBatchDto {
    /// Target batch, or null to unassign
    pub batch_id: Option<BatchId>,
}

/// Outcome of moving a student between batches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct StudentBatchAssignment {
    pub student_id: UserId,
    pub previous_batch_id: Option<BatchId>,
    pub batch_id: Option<BatchId>,
}

/// A freshly provisioned account. The temporary password is only ever
/// returned here.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreatedStudent {
    #[serde(flatten)]
    pub student: Student,
    pub temporary_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_dto() -> CreateStudentDto {
        CreateStudentDto {
            name: "Kavindi Silva".into(),
            email: "kavindi.silva@email.com".into(),
            phone: Some("+94723456789".into()),
            student_id_number: None,
            dob: NaiveDate::from_ymd_opt(2008, 12, 10),
            grade: Some("Grade 10".into()),
            address: Some("789 Main Street, Matara".into()),
            contact_number: None,
            class_type: Some(ClassType::Both),
            batch_id: None,
        }
    }

    #[test]
    fn test_create_student_validation() {
        assert!(create_dto().validate().is_ok());

        let bad_email = CreateStudentDto {
            email: "kavindi".into(),
            ..create_dto()
        };
        assert!(bad_email.validate().is_err());

        let blank_number = CreateStudentDto {
            student_id_number: Some(String::new()),
            ..create_dto()
        };
        assert!(blank_number.validate().is_err());
    }

    #[test]
    fn test_assign_batch_dto_accepts_null() {
        let dto: AssignBatchDto = serde_json::from_str(r#"{"batch_id":null}"#).unwrap();
        assert!(dto.batch_id.is_none());
    }
}
