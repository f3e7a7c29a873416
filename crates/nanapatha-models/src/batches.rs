//! Batch domain models and DTOs.
//!
//! A batch is a cohort taught together under one subject and grade. It has
//! a fixed number of seats (`capacity`), a denormalized seat counter
//! (`current_enrollment`) and at most one teacher. The counter is only
//! written by the capacity assignment operations.

use chrono::{DateTime, NaiveDate, Utc};
use nanapatha_core::{
    PaginationMeta, PaginationParams,
    serde::{empty_string_as_none, trimmed_string},
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::enums::ClassType;
use crate::ids::{BatchId, UserId};

/// Column list matching [`Batch`], prefixed with the `b` table alias.
pub const BATCH_COLUMNS: &str = "b.id, b.name, b.grade, b.subject, b.capacity, \
     b.current_enrollment, b.teacher_id, b.class_type, b.start_date, b.end_date, \
     b.is_active, b.notes, b.created_at, b.updated_at";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Batch {
    pub id: BatchId,
    /// e.g. "A/L Physics 2026 - Batch A"
    pub name: String,
    pub grade: String,
    pub subject: String,
    /// Number of seats, always positive
    pub capacity: i32,
    /// Students currently assigned, between 0 and `capacity`
    pub current_enrollment: i32,
    /// User id of the assigned teacher
    pub teacher_id: Option<UserId>,
    pub class_type: ClassType,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Archived batches are inactive and accept no new students
    pub is_active: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Batch {
    pub fn available_seats(&self) -> i32 {
        (self.capacity - self.current_enrollment).max(0)
    }

    pub fn is_full(&self) -> bool {
        self.current_enrollment >= self.capacity
    }
}

/// Batch joined with its teacher's name.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BatchSummary {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub batch: Batch,
    pub teacher_name: Option<String>,
}

/// A student as listed on a batch roster.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RosterEntry {
    pub user_id: UserId,
    pub name: String,
    pub email: String,
    pub student_id_number: String,
    pub grade: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BatchDetail {
    #[serde(flatten)]
    pub batch: BatchSummary,
    pub students: Vec<RosterEntry>,
}

/// Roster management view: who is in the batch and who could join.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BatchRoster {
    pub batch: BatchSummary,
    pub current_students: Vec<RosterEntry>,
    /// Active students not assigned to any batch
    pub available_students: Vec<RosterEntry>,
}

fn validate_date_order(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<(), ValidationError> {
    match (start, end) {
        (Some(start), Some(end)) if start > end => {
            let mut err = ValidationError::new("date_order");
            err.message = Some("start_date must not be after end_date".into());
            Err(err)
        }
        _ => Ok(()),
    }
}

fn validate_create_dates(dto: &CreateBatchDto) -> Result<(), ValidationError> {
    validate_date_order(dto.start_date, dto.end_date)
}

fn validate_update_dates(dto: &UpdateBatchDto) -> Result<(), ValidationError> {
    validate_date_order(dto.start_date, dto.end_date)
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_create_dates"))]
pub struct CreateBatchDto {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 20))]
    pub grade: String,
    #[validate(length(min = 1, max = 100))]
    pub subject: String,
    #[validate(range(min = 1, max = 1000))]
    pub capacity: i32,
    pub class_type: ClassType,
    /// Teacher to assign right away; evicts them from any other batch
    pub teacher_id: Option<UserId>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Partial update. Enrollment and teacher are changed through their own endpoints.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_update_dates"))]
pub struct UpdateBatchDto {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub grade: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub subject: Option<String>,
    /// May not drop below the current enrollment
    #[validate(range(min = 1, max = 1000))]
    pub capacity: Option<i32>,
    pub class_type: Option<ClassType>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BatchFilterParams {
    /// Case-insensitive match on the batch name
    #[serde(default, deserialize_with = "trimmed_string")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub subject: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub grade: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub is_active: Option<bool>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedBatchesResponse {
    pub data: Vec<BatchSummary>,
    pub meta: PaginationMeta,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BatchStudentDto {
    /// User id of the student
    pub student_id: UserId,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SetBatchTeacherDto {
    /// User id of the teacher, or null to leave the batch without one
    pub teacher_id: Option<UserId>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReconcileReport {
    /// Batches whose counter disagreed with the roster and was rewritten
    pub batches_corrected: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_dto() -> CreateBatchDto {
        CreateBatchDto {
            name: "A/L Physics 2026 - Batch A".into(),
            grade: "A/L".into(),
            subject: "Physics".into(),
            capacity: 30,
            class_type: ClassType::Physical,
            teacher_id: None,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 6),
            end_date: NaiveDate::from_ymd_opt(2026, 8, 31),
            notes: None,
        }
    }

    #[test]
    fn test_create_batch_validation() {
        assert!(create_dto().validate().is_ok());

        let zero_capacity = CreateBatchDto {
            capacity: 0,
            ..create_dto()
        };
        assert!(zero_capacity.validate().is_err());

        let empty_name = CreateBatchDto {
            name: String::new(),
            ..create_dto()
        };
        assert!(empty_name.validate().is_err());

        let reversed = CreateBatchDto {
            start_date: NaiveDate::from_ymd_opt(2026, 9, 1),
            ..create_dto()
        };
        assert!(reversed.validate().is_err());
    }

    #[test]
    fn test_update_batch_validation() {
        assert!(UpdateBatchDto::default().validate().is_ok());

        let bad_capacity = UpdateBatchDto {
            capacity: Some(0),
            ..Default::default()
        };
        assert!(bad_capacity.validate().is_err());
    }

    #[test]
    fn test_seats() {
        let dto = create_dto();
        let batch = Batch {
            id: BatchId::new(),
            name: dto.name,
            grade: dto.grade,
            subject: dto.subject,
            capacity: 2,
            current_enrollment: 2,
            teacher_id: None,
            class_type: dto.class_type,
            start_date: None,
            end_date: None,
            is_active: true,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(batch.is_full());
        assert_eq!(batch.available_seats(), 0);
    }
}
