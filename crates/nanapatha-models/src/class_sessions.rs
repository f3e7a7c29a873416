//! Class session models and DTOs.
//!
//! A class session is one scheduled meeting of a batch on a date between a
//! start and end time, optionally with a teacher and a classroom. No overlap
//! checks are made between sessions.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use nanapatha_core::{PaginationMeta, PaginationParams, serde::empty_string_as_none};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::enums::SessionStatus;
use crate::ids::{BatchId, ClassSessionId, ClassroomId, UserId};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ClassSession {
    pub id: ClassSessionId,
    pub batch_id: BatchId,
    /// User id of the teacher taking the session
    pub teacher_id: Option<UserId>,
    pub classroom_id: Option<ClassroomId>,
    pub date: NaiveDate,
    #[schema(value_type = String, example = "09:00:00")]
    pub start_time: NaiveTime,
    #[schema(value_type = String, example = "11:00:00")]
    pub end_time: NaiveTime,
    pub topic: Option<String>,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Session joined with the names shown on schedules.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ClassSessionDetail {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub session: ClassSession,
    pub batch_name: String,
    pub teacher_name: Option<String>,
    pub classroom_name: Option<String>,
}

fn validate_time_order(dto: &CreateClassSessionDto) -> Result<(), ValidationError> {
    if dto.start_time >= dto.end_time {
        let mut err = ValidationError::new("time_order");
        err.message = Some("start_time must be before end_time".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_time_order"))]
pub struct CreateClassSessionDto {
    pub batch_id: BatchId,
    pub teacher_id: Option<UserId>,
    pub classroom_id: Option<ClassroomId>,
    pub date: NaiveDate,
    /// "HH:MM" or "HH:MM:SS"
    #[schema(value_type = String, example = "09:00")]
    pub start_time: NaiveTime,
    #[schema(value_type = String, example = "11:00")]
    pub end_time: NaiveTime,
    #[validate(length(max = 200))]
    pub topic: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateSessionStatusDto {
    pub status: SessionStatus,
}

#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ClassSessionFilterParams {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub batch_id: Option<BatchId>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub teacher_id: Option<UserId>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub classroom_id: Option<ClassroomId>,
    /// Inclusive lower bound on the session date
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper bound on the session date
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub date_to: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub status: Option<SessionStatus>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedClassSessionsResponse {
    pub data: Vec<ClassSessionDetail>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_order_validation() {
        let dto: CreateClassSessionDto = serde_json::from_value(serde_json::json!({
            "batch_id": BatchId::new(),
            "date": "2024-10-08",
            "start_time": "09:00",
            "end_time": "11:00",
        }))
        .unwrap();
        assert!(dto.validate().is_ok());

        let reversed = CreateClassSessionDto {
            start_time: dto.end_time,
            end_time: dto.start_time,
            ..dto.clone()
        };
        assert!(reversed.validate().is_err());

        let empty = CreateClassSessionDto {
            end_time: dto.start_time,
            ..dto
        };
        assert!(empty.validate().is_err());
    }
}
