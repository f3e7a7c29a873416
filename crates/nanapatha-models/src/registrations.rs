//! Registration request models and DTOs.
//!
//! A registration request is an applicant's submission. It starts `pending`
//! and is processed exactly once, to `accepted` (which provisions a student
//! account) or `rejected` (which records the reason).

use chrono::{DateTime, NaiveDate, Utc};
use nanapatha_core::{
    PaginationMeta, PaginationParams,
    serde::{empty_string_as_none, trimmed_string},
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::batches::Batch;
use crate::enums::{ClassType, PaymentStatus, RegistrationStatus, RegistrationType};
use crate::ids::{BatchId, RegistrationRequestId};
use crate::students::StudentProfile;
use crate::users::User;

pub const REGISTRATION_COLUMNS: &str = "id, name, email, mobile, address, dob, grade, \
     class_type, selected_batch_id, student_id_number, registration_type, payment_status, \
     payment_amount, payment_method, transaction_id, passport_photo_path, \
     student_id_card_path, payment_slip_path, status, claimed_by, claimed_at, admin_note, \
     submitted_at, processed_at";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RegistrationRequest {
    pub id: RegistrationRequestId,
    pub name: String,
    pub email: String,
    pub mobile: Option<String>,
    pub address: Option<String>,
    pub dob: Option<NaiveDate>,
    pub grade: Option<String>,
    pub class_type: Option<ClassType>,
    /// Batch chosen by a new applicant
    pub selected_batch_id: Option<BatchId>,
    /// Institute number supplied by an existing student
    pub student_id_number: Option<String>,
    pub registration_type: RegistrationType,
    pub payment_status: PaymentStatus,
    pub payment_amount: Option<f64>,
    pub payment_method: Option<String>,
    pub transaction_id: Option<String>,
    pub passport_photo_path: Option<String>,
    pub student_id_card_path: Option<String>,
    pub payment_slip_path: Option<String>,
    pub status: RegistrationStatus,
    /// Reviewer currently holding the request
    pub claimed_by: Option<String>,
    pub claimed_at: Option<DateTime<Utc>>,
    /// Acceptance stamp or rejection reason
    pub admin_note: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl RegistrationRequest {
    /// Whether `actor` may process the request: unclaimed, or claimed by them.
    pub fn is_claimable_by(&self, actor: &str) -> bool {
        self.claimed_by.as_deref().is_none_or(|holder| holder == actor)
    }
}

/// Public form for applicants new to the institute.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SubmitNewRegistrationDto {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 7, max = 20))]
    pub mobile: String,
    #[validate(length(min = 1))]
    pub address: String,
    pub dob: NaiveDate,
    #[validate(length(min = 1, max = 20))]
    pub grade: String,
    pub class_type: ClassType,
    pub selected_batch_id: Option<BatchId>,
    #[validate(range(min = 0.0))]
    pub payment_amount: Option<f64>,
    #[validate(length(max = 50))]
    pub payment_method: Option<String>,
    #[validate(length(max = 100))]
    pub transaction_id: Option<String>,
}

/// Public form for students already enrolled who need an account.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SubmitExistingRegistrationDto {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 7, max = 20))]
    pub mobile: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub student_id_number: String,
}

/// Rejection reason. Blank reasons are refused by the workflow itself.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RejectRegistrationDto {
    #[serde(default)]
    pub reason: String,
}

/// Status filter for the review queue. Defaults to `pending`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatusFilter {
    #[default]
    Pending,
    Accepted,
    Rejected,
    All,
}

impl RegistrationStatusFilter {
    pub fn status(self) -> Option<RegistrationStatus> {
        match self {
            Self::Pending => Some(RegistrationStatus::Pending),
            Self::Accepted => Some(RegistrationStatus::Accepted),
            Self::Rejected => Some(RegistrationStatus::Rejected),
            Self::All => None,
        }
    }
}

impl std::str::FromStr for RegistrationStatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            other => other.parse::<RegistrationStatus>().map(|status| match status {
                RegistrationStatus::Pending => Self::Pending,
                RegistrationStatus::Accepted => Self::Accepted,
                RegistrationStatus::Rejected => Self::Rejected,
            }),
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RegistrationFilterParams {
    /// pending (default), accepted, rejected or all
    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[param(value_type = Option<String>)]
    pub status: Option<RegistrationStatusFilter>,
    /// new or existing; omitted means both
    #[serde(default, rename = "type", deserialize_with = "empty_string_as_none")]
    pub registration_type: Option<RegistrationType>,
    /// Case-insensitive match on applicant name or email
    #[serde(default, deserialize_with = "trimmed_string")]
    pub search: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedRegistrationsResponse {
    pub data: Vec<RegistrationRequest>,
    pub meta: PaginationMeta,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RegistrationDetail {
    #[serde(flatten)]
    pub request: RegistrationRequest,
    pub selected_batch: Option<Batch>,
}

/// Result of accepting a request. The temporary password is only ever
/// returned here.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AcceptedRegistration {
    pub request: RegistrationRequest,
    pub user: User,
    pub profile: StudentProfile,
    pub temporary_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(claimed_by: Option<&str>) -> RegistrationRequest {
        RegistrationRequest {
            id: RegistrationRequestId::new(),
            name: "Dhanush Rajapaksa".into(),
            email: "dhanush.rajapaksa@email.com".into(),
            mobile: Some("+94734567890".into()),
            address: Some("321 Temple Road, Negombo".into()),
            dob: NaiveDate::from_ymd_opt(2009, 3, 18),
            grade: Some("Grade 9".into()),
            class_type: Some(ClassType::Physical),
            selected_batch_id: None,
            student_id_number: None,
            registration_type: RegistrationType::New,
            payment_status: PaymentStatus::Pending,
            payment_amount: None,
            payment_method: None,
            transaction_id: None,
            passport_photo_path: None,
            student_id_card_path: None,
            payment_slip_path: None,
            status: RegistrationStatus::Pending,
            claimed_by: claimed_by.map(str::to_string),
            claimed_at: None,
            admin_note: None,
            submitted_at: Utc::now(),
            processed_at: None,
        }
    }

    #[test]
    fn test_claim_ownership() {
        assert!(request(None).is_claimable_by("Admin User"));
        assert!(request(Some("Admin User")).is_claimable_by("Admin User"));
        assert!(!request(Some("Reviewer B")).is_claimable_by("Admin User"));
    }

    #[test]
    fn test_status_filter_parsing() {
        assert_eq!(
            "all".parse::<RegistrationStatusFilter>().unwrap().status(),
            None
        );
        assert_eq!(
            "rejected".parse::<RegistrationStatusFilter>().unwrap(),
            RegistrationStatusFilter::Rejected
        );
        assert_eq!(
            RegistrationStatusFilter::default().status(),
            Some(RegistrationStatus::Pending)
        );
        assert!("archived".parse::<RegistrationStatusFilter>().is_err());
    }

    #[test]
    fn test_submit_new_validation() {
        let dto: SubmitNewRegistrationDto = serde_json::from_value(serde_json::json!({
            "name": "Sachini Perera",
            "email": "sachini.perera@email.com",
            "mobile": "+94745678901",
            "address": "654 Beach Road, Galle",
            "dob": "2008-07-25",
            "grade": "Grade 10",
            "class_type": "online"
        }))
        .unwrap();
        assert!(dto.validate().is_ok());

        let bad = SubmitNewRegistrationDto {
            mobile: "123".into(),
            ..dto
        };
        assert!(bad.validate().is_err());
    }
}
