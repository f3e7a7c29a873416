use anyhow::anyhow;
use chrono::Utc;
use sqlx::{PgConnection, PgPool};
use tracing::{info, instrument, warn};

use nanapatha_core::{AppError, PaginationMeta};
use nanapatha_models::batches::{BATCH_COLUMNS, Batch};
use nanapatha_models::ids::{BatchId, RegistrationRequestId};
use nanapatha_models::students::CreateStudentDto;
use nanapatha_models::{PaymentStatus, RegistrationStatus, RegistrationType};

use crate::metrics::{track_registration_processed, track_registration_submitted, track_user_created};
use crate::modules::registrations::model::{
    AcceptedRegistration, PaginatedRegistrationsResponse, REGISTRATION_COLUMNS,
    RegistrationDetail, RegistrationFilterParams, RegistrationRequest,
    SubmitExistingRegistrationDto, SubmitNewRegistrationDto,
};
use crate::modules::students::service::StudentService;

const REGISTRATION_FILTER: &str = r#"WHERE ($1::registration_status IS NULL OR status = $1)
  AND ($2::registration_type IS NULL OR registration_type = $2)
  AND ($3::text IS NULL OR name ILIKE $3 OR email ILIKE $3)"#;

/// The registration review workflow.
///
/// A request moves `pending -> accepted` or `pending -> rejected`, once.
/// Reviewers may take an exclusive claim on a pending request; while it is
/// held, only the holder can accept, reject or release it.
pub struct RegistrationService;

impl RegistrationService {
    #[instrument(skip(db, dto), fields(email = %dto.email))]
    pub async fn submit_new(
        db: &PgPool,
        dto: SubmitNewRegistrationDto,
    ) -> Result<RegistrationRequest, AppError> {
        if let Some(batch_id) = dto.selected_batch_id {
            Self::ensure_batch_open(db, batch_id).await?;
        }

        let sql = format!(
            r#"INSERT INTO registration_requests
                   (name, email, mobile, address, dob, grade, class_type, selected_batch_id,
                    registration_type, payment_status, payment_amount, payment_method,
                    transaction_id)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
               RETURNING {}"#,
            REGISTRATION_COLUMNS
        );
        let request = sqlx::query_as::<_, RegistrationRequest>(&sql)
            .bind(&dto.name)
            .bind(&dto.email)
            .bind(&dto.mobile)
            .bind(&dto.address)
            .bind(dto.dob)
            .bind(&dto.grade)
            .bind(dto.class_type)
            .bind(dto.selected_batch_id)
            .bind(RegistrationType::New)
            .bind(PaymentStatus::Pending)
            .bind(dto.payment_amount)
            .bind(&dto.payment_method)
            .bind(&dto.transaction_id)
            .fetch_one(db)
            .await?;

        track_registration_submitted(RegistrationType::New.as_str());
        info!(request_id = %request.id, "New registration submitted");

        Ok(request)
    }

    #[instrument(skip(db, dto), fields(email = %dto.email))]
    pub async fn submit_existing(
        db: &PgPool,
        dto: SubmitExistingRegistrationDto,
    ) -> Result<RegistrationRequest, AppError> {
        let sql = format!(
            r#"INSERT INTO registration_requests
                   (name, email, mobile, student_id_number, registration_type, payment_status)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING {}"#,
            REGISTRATION_COLUMNS
        );
        let request = sqlx::query_as::<_, RegistrationRequest>(&sql)
            .bind(&dto.name)
            .bind(&dto.email)
            .bind(&dto.mobile)
            .bind(dto.student_id_number.trim())
            .bind(RegistrationType::Existing)
            .bind(PaymentStatus::Paid)
            .fetch_one(db)
            .await?;

        track_registration_submitted(RegistrationType::Existing.as_str());
        info!(request_id = %request.id, "Existing-student registration submitted");

        Ok(request)
    }

    async fn ensure_batch_open(db: &PgPool, batch_id: BatchId) -> Result<(), AppError> {
        let is_active =
            sqlx::query_scalar::<_, bool>("SELECT is_active FROM batches WHERE id = $1")
                .bind(batch_id)
                .fetch_optional(db)
                .await?;

        match is_active {
            Some(true) => Ok(()),
            Some(false) => Err(AppError::bad_request(anyhow!(
                "The selected batch is no longer open"
            ))),
            None => Err(AppError::bad_request(anyhow!(
                "The selected batch does not exist"
            ))),
        }
    }

    #[instrument(skip(db))]
    pub async fn list(
        db: &PgPool,
        filters: RegistrationFilterParams,
    ) -> Result<PaginatedRegistrationsResponse, AppError> {
        let status = filters.status.unwrap_or_default().status();
        let search = filters.search.as_ref().map(|s| format!("%{}%", s));

        let count_sql = format!("SELECT COUNT(*) FROM registration_requests {}", REGISTRATION_FILTER);
        let total = sqlx::query_scalar::<_, i64>(&count_sql)
            .bind(status)
            .bind(filters.registration_type)
            .bind(&search)
            .fetch_one(db)
            .await?;

        let data_sql = format!(
            "SELECT {} FROM registration_requests {} ORDER BY submitted_at DESC, id LIMIT $4 OFFSET $5",
            REGISTRATION_COLUMNS, REGISTRATION_FILTER
        );
        let requests = sqlx::query_as::<_, RegistrationRequest>(&data_sql)
            .bind(status)
            .bind(filters.registration_type)
            .bind(&search)
            .bind(filters.pagination.limit())
            .bind(filters.pagination.offset())
            .fetch_all(db)
            .await?;

        Ok(PaginatedRegistrationsResponse {
            data: requests,
            meta: PaginationMeta::new(total, &filters.pagination),
        })
    }

    #[instrument(skip(db))]
    pub async fn get(
        db: &PgPool,
        id: RegistrationRequestId,
    ) -> Result<RegistrationDetail, AppError> {
        let sql = format!(
            "SELECT {} FROM registration_requests WHERE id = $1",
            REGISTRATION_COLUMNS
        );
        let request = sqlx::query_as::<_, RegistrationRequest>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Registration request not found")))?;

        let selected_batch = match request.selected_batch_id {
            Some(batch_id) => {
                let sql = format!("SELECT {} FROM batches b WHERE b.id = $1", BATCH_COLUMNS);
                sqlx::query_as::<_, Batch>(&sql)
                    .bind(batch_id)
                    .fetch_optional(db)
                    .await?
            }
            None => None,
        };

        Ok(RegistrationDetail {
            request,
            selected_batch,
        })
    }

    /// Locks the request row for the rest of the transaction.
    async fn lock_request(
        conn: &mut PgConnection,
        id: RegistrationRequestId,
    ) -> Result<RegistrationRequest, AppError> {
        let sql = format!(
            "SELECT {} FROM registration_requests WHERE id = $1 FOR UPDATE",
            REGISTRATION_COLUMNS
        );
        sqlx::query_as::<_, RegistrationRequest>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Registration request not found")))
    }

    /// Common guard for accept and reject: still pending, and not claimed by
    /// somebody else.
    fn ensure_processable(request: &RegistrationRequest, actor: &str) -> Result<(), AppError> {
        if request.status.is_terminal() {
            return Err(AppError::invalid_state(anyhow!(
                "Registration request has already been processed ({})",
                request.status
            )));
        }

        if !request.is_claimable_by(actor) {
            return Err(AppError::conflict(anyhow!(
                "Registration request is claimed by {}",
                request.claimed_by.as_deref().unwrap_or_default()
            )));
        }

        Ok(())
    }

    /// Accepts a pending request and provisions the student account.
    ///
    /// User, profile, batch seat and the request's new status are written in
    /// one transaction. A duplicate email or student number, or a full batch,
    /// leaves the request pending and nothing else persisted.
    #[instrument(skip(db))]
    pub async fn accept(
        db: &PgPool,
        id: RegistrationRequestId,
        actor: &str,
    ) -> Result<AcceptedRegistration, AppError> {
        let mut tx = db.begin().await?;

        let request = Self::lock_request(&mut tx, id).await?;
        Self::ensure_processable(&request, actor)?;

        let provisioned = StudentService::provision_in_tx(
            &mut tx,
            CreateStudentDto {
                name: request.name.clone(),
                email: request.email.clone(),
                phone: request.mobile.clone(),
                student_id_number: request.student_id_number.clone(),
                dob: request.dob,
                grade: request.grade.clone(),
                address: request.address.clone(),
                contact_number: request.mobile.clone(),
                class_type: request.class_type,
                batch_id: request.selected_batch_id,
            },
        )
        .await?;

        let now = Utc::now();
        let note = format!("Accepted by {} on {}", actor, now.format("%Y-%m-%d %H:%M"));
        let sql = format!(
            r#"UPDATE registration_requests
               SET status = $2, admin_note = $3, processed_at = $4
               WHERE id = $1
               RETURNING {}"#,
            REGISTRATION_COLUMNS
        );
        let request = sqlx::query_as::<_, RegistrationRequest>(&sql)
            .bind(id)
            .bind(RegistrationStatus::Accepted)
            .bind(&note)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        track_registration_processed("accepted");
        track_user_created("student");
        info!(
            request_id = %id,
            actor = %actor,
            user_id = %provisioned.user.id,
            student_number = %provisioned.profile.student_id_number,
            "Registration accepted"
        );

        Ok(AcceptedRegistration {
            request,
            user: provisioned.user,
            profile: provisioned.profile,
            temporary_password: provisioned.temporary_password,
        })
    }

    /// Rejects a pending request with a non-blank reason.
    #[instrument(skip(db))]
    pub async fn reject(
        db: &PgPool,
        id: RegistrationRequestId,
        reason: &str,
        actor: &str,
    ) -> Result<RegistrationRequest, AppError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::bad_request(anyhow!(
                "A reason is required to reject a registration"
            )));
        }

        let mut tx = db.begin().await?;

        let request = Self::lock_request(&mut tx, id).await?;
        Self::ensure_processable(&request, actor)?;

        let sql = format!(
            r#"UPDATE registration_requests
               SET status = $2, admin_note = $3, processed_at = NOW()
               WHERE id = $1
               RETURNING {}"#,
            REGISTRATION_COLUMNS
        );
        let request = sqlx::query_as::<_, RegistrationRequest>(&sql)
            .bind(id)
            .bind(RegistrationStatus::Rejected)
            .bind(reason)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        track_registration_processed("rejected");
        info!(request_id = %id, actor = %actor, reason = %reason, "Registration rejected");

        Ok(request)
    }

    /// Takes the exclusive claim on a pending request. Re-claiming by the
    /// holder refreshes `claimed_at`.
    #[instrument(skip(db))]
    pub async fn claim(
        db: &PgPool,
        id: RegistrationRequestId,
        actor: &str,
    ) -> Result<RegistrationRequest, AppError> {
        let mut tx = db.begin().await?;

        let request = Self::lock_request(&mut tx, id).await?;
        Self::ensure_processable(&request, actor)?;

        let sql = format!(
            r#"UPDATE registration_requests
               SET claimed_by = $2, claimed_at = NOW()
               WHERE id = $1
               RETURNING {}"#,
            REGISTRATION_COLUMNS
        );
        let request = sqlx::query_as::<_, RegistrationRequest>(&sql)
            .bind(id)
            .bind(actor)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(request_id = %id, actor = %actor, "Registration claimed");

        Ok(request)
    }

    /// Drops the claim. Only the holder may release; an unclaimed request is
    /// returned unchanged.
    #[instrument(skip(db))]
    pub async fn release(
        db: &PgPool,
        id: RegistrationRequestId,
        actor: &str,
    ) -> Result<RegistrationRequest, AppError> {
        let mut tx = db.begin().await?;

        let request = Self::lock_request(&mut tx, id).await?;
        let Some(holder) = request.claimed_by.as_deref() else {
            return Ok(request);
        };

        if holder != actor {
            warn!(request_id = %id, actor = %actor, holder = %holder, "Release refused");
            return Err(AppError::conflict(anyhow!(
                "Registration request is claimed by {}",
                holder
            )));
        }

        let sql = format!(
            r#"UPDATE registration_requests
               SET claimed_by = NULL, claimed_at = NULL
               WHERE id = $1
               RETURNING {}"#,
            REGISTRATION_COLUMNS
        );
        let request = sqlx::query_as::<_, RegistrationRequest>(&sql)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(request_id = %id, actor = %actor, "Registration claim released");

        Ok(request)
    }

    /// Records payment. Independent of the review status.
    #[instrument(skip(db))]
    pub async fn mark_paid(
        db: &PgPool,
        id: RegistrationRequestId,
        actor: &str,
    ) -> Result<RegistrationRequest, AppError> {
        let sql = format!(
            r#"UPDATE registration_requests
               SET payment_status = $2
               WHERE id = $1
               RETURNING {}"#,
            REGISTRATION_COLUMNS
        );
        let request = sqlx::query_as::<_, RegistrationRequest>(&sql)
            .bind(id)
            .bind(PaymentStatus::Paid)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Registration request not found")))?;

        info!(request_id = %id, actor = %actor, "Registration marked paid");

        Ok(request)
    }
}
