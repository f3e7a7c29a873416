//! Classroom models and DTOs.

use chrono::{DateTime, Utc};
use nanapatha_core::{
    PaginationMeta, PaginationParams,
    serde::{empty_string_as_none, trimmed_string},
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::ids::ClassroomId;

pub const CLASSROOM_COLUMNS: &str =
    "id, name, capacity, location, is_active, notes, created_at, updated_at";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Classroom {
    pub id: ClassroomId,
    /// e.g. "Room A-101"
    pub name: String,
    pub capacity: i32,
    pub location: Option<String>,
    pub is_active: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateClassroomDto {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(range(min = 1, max = 1000))]
    pub capacity: i32,
    #[validate(length(max = 200))]
    pub location: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateClassroomDto {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(range(min = 1, max = 1000))]
    pub capacity: Option<i32>,
    #[validate(length(max = 200))]
    pub location: Option<String>,
    pub notes: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ClassroomFilterParams {
    /// Case-insensitive match on name or location
    #[serde(default, deserialize_with = "trimmed_string")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub is_active: Option<bool>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedClassroomsResponse {
    pub data: Vec<Classroom>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classroom_capacity_must_be_positive() {
        let dto = CreateClassroomDto {
            name: "Lab B-201".into(),
            capacity: 0,
            location: Some("Building B, 2nd Floor".into()),
            notes: None,
        };
        assert!(dto.validate().is_err());

        let dto = CreateClassroomDto { capacity: 25, ..dto };
        assert!(dto.validate().is_ok());
    }
}
