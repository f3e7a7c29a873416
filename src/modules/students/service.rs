use anyhow::anyhow;
use sqlx::{PgConnection, PgExecutor, PgPool};
use tracing::{info, instrument};

use nanapatha_core::{AppError, PaginationMeta, generate_temporary_password, hash_password};
use nanapatha_models::ids::{BatchId, UserId};
use nanapatha_models::users::{USER_COLUMNS, User};
use nanapatha_models::{UserRole, UserStatus};

use crate::metrics::track_user_created;
use crate::modules::assignments::AssignmentService;
use crate::modules::students::model::{
    CreateStudentDto, CreatedStudent, PaginatedStudentsResponse, STUDENT_PROFILE_COLUMNS,
    Student, StudentBatchAssignment, StudentFilterParams, StudentProfile, UpdateStudentDto,
};

const STUDENT_SELECT: &str = r#"SELECT u.id, u.name, u.email, u.phone, u.status, u.created_at,
       sp.id AS profile_id, sp.student_id_number, sp.dob, sp.grade, sp.address,
       sp.contact_number, sp.class_type, sp.batch_id, b.name AS batch_name
FROM users u
JOIN student_profiles sp ON sp.user_id = u.id
LEFT JOIN batches b ON b.id = sp.batch_id"#;

const STUDENT_FILTER: &str = r#"WHERE u.role = 'student'
  AND ($1::user_status IS NULL OR u.status = $1)
  AND ($2::uuid IS NULL OR sp.batch_id = $2)
  AND ($3::text IS NULL OR u.name ILIKE $3 OR u.email ILIKE $3)"#;

/// A student account created inside a caller's transaction.
#[derive(Debug)]
pub struct ProvisionedStudent {
    pub user: User,
    pub profile: StudentProfile,
    pub temporary_password: String,
}

pub struct StudentService;

impl StudentService {
    #[instrument(skip(db))]
    pub async fn get_students(
        db: &PgPool,
        filters: StudentFilterParams,
    ) -> Result<PaginatedStudentsResponse, AppError> {
        let search = filters.search.as_ref().map(|s| format!("%{}%", s));

        let count_sql = format!(
            "SELECT COUNT(*) FROM users u JOIN student_profiles sp ON sp.user_id = u.id {}",
            STUDENT_FILTER
        );
        let total = sqlx::query_scalar::<_, i64>(&count_sql)
            .bind(filters.status)
            .bind(filters.batch_id)
            .bind(&search)
            .fetch_one(db)
            .await?;

        let data_sql = format!(
            "{} {} ORDER BY u.name ASC, u.id LIMIT $4 OFFSET $5",
            STUDENT_SELECT, STUDENT_FILTER
        );
        let students = sqlx::query_as::<_, Student>(&data_sql)
            .bind(filters.status)
            .bind(filters.batch_id)
            .bind(&search)
            .bind(filters.pagination.limit())
            .bind(filters.pagination.offset())
            .fetch_all(db)
            .await?;

        Ok(PaginatedStudentsResponse {
            data: students,
            meta: PaginationMeta::new(total, &filters.pagination),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_student(db: &PgPool, id: UserId) -> Result<Student, AppError> {
        Self::find_student(db, id).await
    }

    async fn find_student<'e, E>(executor: E, id: UserId) -> Result<Student, AppError>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!("{} WHERE u.id = $1 AND u.role = 'student'", STUDENT_SELECT);
        sqlx::query_as::<_, Student>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Student not found")))
    }

    /// Next institute number, `STU` followed by six digits.
    pub async fn next_student_number(conn: &mut PgConnection) -> Result<String, AppError> {
        let number = sqlx::query_scalar::<_, String>(
            "SELECT 'STU' || LPAD(nextval('student_number_seq')::TEXT, 6, '0')",
        )
        .fetch_one(&mut *conn)
        .await?;

        Ok(number)
    }

    /// Creates the user, the profile and, when requested, the batch seat.
    ///
    /// Nothing is committed here; a duplicate email or student number, or a
    /// full batch, fails the caller's transaction as a whole.
    #[instrument(skip(conn, dto), fields(email = %dto.email))]
    pub async fn provision_in_tx(
        conn: &mut PgConnection,
        dto: CreateStudentDto,
    ) -> Result<ProvisionedStudent, AppError> {
        let temporary_password = generate_temporary_password();
        let password_hash = hash_password(&temporary_password)?;

        let user_sql = format!(
            r#"INSERT INTO users (name, email, phone, role, status, temp_password_hash)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING {}"#,
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&user_sql)
            .bind(&dto.name)
            .bind(&dto.email)
            .bind(&dto.phone)
            .bind(UserRole::Student)
            .bind(UserStatus::Active)
            .bind(&password_hash)
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e
                    && db_err.is_unique_violation()
                {
                    return AppError::bad_request(anyhow!(
                        "A user with email {} already exists",
                        dto.email
                    ));
                }
                AppError::from(e)
            })?;

        let student_id_number = match dto
            .student_id_number
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
        {
            Some(number) => number.to_string(),
            None => Self::next_student_number(conn).await?,
        };

        let profile_sql = format!(
            r#"INSERT INTO student_profiles
                   (user_id, dob, grade, address, contact_number, class_type, student_id_number)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING {}"#,
            STUDENT_PROFILE_COLUMNS
        );
        let mut profile = sqlx::query_as::<_, StudentProfile>(&profile_sql)
            .bind(user.id)
            .bind(dto.dob)
            .bind(&dto.grade)
            .bind(&dto.address)
            .bind(&dto.contact_number)
            .bind(dto.class_type)
            .bind(&student_id_number)
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e
                    && db_err.is_unique_violation()
                {
                    return AppError::bad_request(anyhow!(
                        "Student number {} is already in use",
                        student_id_number
                    ));
                }
                AppError::from(e)
            })?;

        if let Some(batch_id) = dto.batch_id {
            AssignmentService::assign_student_in_tx(conn, user.id, Some(batch_id)).await?;
            profile.batch_id = Some(batch_id);
        }

        Ok(ProvisionedStudent {
            user,
            profile,
            temporary_password,
        })
    }

    #[instrument(skip(db, dto))]
    pub async fn create_student(
        db: &PgPool,
        dto: CreateStudentDto,
    ) -> Result<CreatedStudent, AppError> {
        let mut tx = db.begin().await?;
        let provisioned = Self::provision_in_tx(&mut tx, dto).await?;
        let student = Self::find_student(&mut *tx, provisioned.user.id).await?;
        tx.commit().await?;

        track_user_created("student");
        info!(student_id = %student.id, student_number = %student.student_id_number, "Student created");

        Ok(CreatedStudent {
            student,
            temporary_password: provisioned.temporary_password,
        })
    }

    #[instrument(skip(db, dto))]
    pub async fn update_student(
        db: &PgPool,
        id: UserId,
        dto: UpdateStudentDto,
    ) -> Result<Student, AppError> {
        let mut tx = db.begin().await?;

        sqlx::query_scalar::<_, UserId>(
            "SELECT id FROM users WHERE id = $1 AND role = 'student' FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Student not found")))?;

        sqlx::query(
            r#"UPDATE users
               SET name = COALESCE($2, name),
                   email = COALESCE($3, email),
                   phone = COALESCE($4, phone),
                   status = COALESCE($5, status),
                   updated_at = NOW()
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(&dto.name)
        .bind(&dto.email)
        .bind(&dto.phone)
        .bind(dto.status)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                return AppError::bad_request(anyhow!("A user with this email already exists"));
            }
            AppError::from(e)
        })?;

        sqlx::query(
            r#"UPDATE student_profiles
               SET dob = COALESCE($2, dob),
                   grade = COALESCE($3, grade),
                   address = COALESCE($4, address),
                   contact_number = COALESCE($5, contact_number),
                   class_type = COALESCE($6, class_type),
                   updated_at = NOW()
               WHERE user_id = $1"#,
        )
        .bind(id)
        .bind(dto.dob)
        .bind(&dto.grade)
        .bind(&dto.address)
        .bind(&dto.contact_number)
        .bind(dto.class_type)
        .execute(&mut *tx)
        .await?;

        if let Some(batch_id) = dto.batch_id {
            AssignmentService::assign_student_in_tx(&mut tx, id, Some(batch_id)).await?;
        }

        let student = Self::find_student(&mut *tx, id).await?;
        tx.commit().await?;

        Ok(student)
    }

    /// Marks the account inactive. The batch seat is kept.
    #[instrument(skip(db))]
    pub async fn deactivate_student(db: &PgPool, id: UserId) -> Result<Student, AppError> {
        let updated = sqlx::query(
            "UPDATE users SET status = 'inactive', updated_at = NOW() WHERE id = $1 AND role = 'student'",
        )
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(AppError::not_found(anyhow!("Student not found")));
        }

        info!(student_id = %id, "Student deactivated");
        Self::find_student(db, id).await
    }

    #[instrument(skip(db))]
    pub async fn assign_batch(
        db: &PgPool,
        id: UserId,
        batch_id: Option<BatchId>,
    ) -> Result<StudentBatchAssignment, AppError> {
        AssignmentService::assign_student_to_batch(db, id, batch_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nanapatha_core::{ErrorKind, PaginationParams, verify_password};

    fn student_dto(email: &str) -> CreateStudentDto {
        CreateStudentDto {
            name: "Kavindi Silva".into(),
            email: email.into(),
            phone: Some("+94712345678".into()),
            student_id_number: None,
            dob: None,
            grade: Some("Grade 11".into()),
            address: None,
            contact_number: None,
            class_type: None,
            batch_id: None,
        }
    }

    async fn insert_batch(pool: &PgPool, capacity: i32) -> BatchId {
        sqlx::query_scalar(
            "INSERT INTO batches (name, grade, subject, capacity) VALUES ('O/L Maths', 'Grade 11', 'Maths', $1) RETURNING id",
        )
        .bind(capacity)
        .fetch_one(pool)
        .await
        .unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_create_student_generates_number_and_password(pool: PgPool) {
        let created = StudentService::create_student(&pool, student_dto("kavindi@test.com"))
            .await
            .unwrap();

        assert_eq!(created.student.student_id_number, "STU000001");
        assert_eq!(created.student.status, UserStatus::Active);

        let hash: Option<String> =
            sqlx::query_scalar("SELECT temp_password_hash FROM users WHERE id = $1")
                .bind(created.student.id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert!(verify_password(&created.temporary_password, &hash.unwrap()).unwrap());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_create_student_into_full_batch_persists_nothing(pool: PgPool) {
        let batch = insert_batch(&pool, 1).await;
        let first = CreateStudentDto {
            batch_id: Some(batch),
            ..student_dto("first@test.com")
        };
        StudentService::create_student(&pool, first).await.unwrap();

        let second = CreateStudentDto {
            batch_id: Some(batch),
            ..student_dto("second@test.com")
        };
        let err = StudentService::create_student(&pool, second)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Capacity);

        let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = 'second@test.com'")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(users, 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_duplicate_email_is_validation_error(pool: PgPool) {
        StudentService::create_student(&pool, student_dto("dup@test.com"))
            .await
            .unwrap();
        let err = StudentService::create_student(&pool, student_dto("dup@test.com"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_list_filters_by_search_and_batch(pool: PgPool) {
        let batch = insert_batch(&pool, 5).await;
        StudentService::create_student(
            &pool,
            CreateStudentDto {
                name: "Nimal Fernando".into(),
                batch_id: Some(batch),
                ..student_dto("nimal@test.com")
            },
        )
        .await
        .unwrap();
        StudentService::create_student(&pool, student_dto("other@test.com"))
            .await
            .unwrap();

        let by_search = StudentService::get_students(
            &pool,
            StudentFilterParams {
                search: Some("nimal".into()),
                status: None,
                batch_id: None,
                pagination: PaginationParams::default(),
            },
        )
        .await
        .unwrap();
        assert_eq!(by_search.meta.total, 1);

        let by_batch = StudentService::get_students(
            &pool,
            StudentFilterParams {
                search: None,
                status: None,
                batch_id: Some(batch),
                pagination: PaginationParams::default(),
            },
        )
        .await
        .unwrap();
        assert_eq!(by_batch.data.len(), 1);
        assert_eq!(by_batch.data[0].batch_name.as_deref(), Some("O/L Maths"));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_deactivate_unknown_student(pool: PgPool) {
        let err = StudentService::deactivate_student(&pool, UserId::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
