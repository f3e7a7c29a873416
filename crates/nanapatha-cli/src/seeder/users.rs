//! User seeding functionality.
//!
//! Provides functions for generating and inserting fake teachers and
//! students, together with their profiles, into the database.

use fake::Fake;
use fake::faker::name::en::*;
use nanapatha_models::enums::{ClassType, UserRole};
use nanapatha_models::{BatchId, UserId};
use rayon::prelude::*;
use sqlx::{PgPool, Postgres, Transaction};
use std::time::Instant;
use uuid::Uuid;

use super::models::{SEED_EMAIL_DOMAIN, SeededBatch, StudentSeed, TeacherSeed, UserSeed};

const SUBJECT_POOL: [&str; 6] = [
    "Mathematics",
    "Science",
    "English",
    "ICT",
    "Sinhala",
    "Commerce",
];

/// Generates teachers, each teaching two neighbouring subjects
pub fn generate_teachers(count: usize, password_hash: &str) -> Vec<TeacherSeed> {
    (0..count)
        .into_par_iter()
        .map(|idx| TeacherSeed {
            user: generate_user(UserRole::Teacher, 0, idx, "teacher", password_hash),
            subjects: vec![
                SUBJECT_POOL[idx % SUBJECT_POOL.len()].to_string(),
                SUBJECT_POOL[(idx + 1) % SUBJECT_POOL.len()].to_string(),
            ],
        })
        .collect()
}

/// Generates students for each batch without exceeding its capacity,
/// followed by students that have no batch yet
pub fn generate_students(
    batches: &[SeededBatch],
    students_per_batch: usize,
    unassigned: usize,
    password_hash: &str,
) -> Vec<StudentSeed> {
    let mut students: Vec<StudentSeed> = batches
        .par_iter()
        .enumerate()
        .flat_map(|(batch_idx, batch)| {
            let seats = students_per_batch.min(batch.capacity.max(0) as usize);
            (0..seats)
                .map(|student_idx| {
                    generate_student(Some(batch.id), batch_idx + 1, student_idx, password_hash)
                })
                .collect::<Vec<_>>()
        })
        .collect();

    students.extend((0..unassigned).map(|idx| generate_student(None, 0, idx, password_hash)));
    students
}

fn generate_student(
    batch_id: Option<BatchId>,
    group_idx: usize,
    user_idx: usize,
    password_hash: &str,
) -> StudentSeed {
    let grade: u8 = (6..12).fake();
    let class_type = if user_idx % 4 == 0 {
        ClassType::Online
    } else {
        ClassType::Physical
    };

    StudentSeed {
        user: generate_user(UserRole::Student, group_idx, user_idx, "student", password_hash),
        grade: format!("Grade {}", grade),
        class_type,
        batch_id,
    }
}

fn generate_user(
    role: UserRole,
    group_idx: usize,
    user_idx: usize,
    role_prefix: &str,
    password_hash: &str,
) -> UserSeed {
    let first_name: String = FirstName().fake();
    let last_name: String = LastName().fake();

    let email = format!(
        "{}.{}+{}{}@{}",
        first_name.to_lowercase(),
        last_name.to_lowercase(),
        role_prefix,
        group_idx * 1000 + user_idx,
        SEED_EMAIL_DOMAIN
    );

    UserSeed {
        name: format!("{} {}", first_name, last_name),
        email,
        phone: Some(format!("07{}", (10_000_000..100_000_000).fake::<u32>())),
        role,
        password_hash: password_hash.to_string(),
    }
}

/// Seeds teachers and their profiles into the database
pub async fn seed_teachers(
    db: &PgPool,
    count: usize,
    password_hash: &str,
) -> Result<Vec<UserId>, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("👩‍🏫 Seeding {} teachers...", count);

    let teachers = generate_teachers(count, password_hash);

    let mut tx = db.begin().await?;
    let users: Vec<&UserSeed> = teachers.iter().map(|t| &t.user).collect();
    let user_ids = insert_users_chunked(&mut tx, &users).await?;

    let ids: Vec<Uuid> = user_ids.iter().map(|id| id.into_inner()).collect();
    let subjects: Vec<String> = teachers.iter().map(|t| t.subjects.join(",")).collect();
    let phones: Vec<Option<String>> = teachers.iter().map(|t| t.user.phone.clone()).collect();

    sqlx::query(
        "INSERT INTO teacher_profiles (user_id, subjects, contact_number)
         SELECT v.user_id, string_to_array(v.subjects, ','), v.phone
         FROM UNNEST($1::uuid[], $2::text[], $3::text[]) AS v(user_id, subjects, phone)",
    )
    .bind(&ids)
    .bind(&subjects)
    .bind(&phones)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    println!(
        "   ✓ Inserted {} teachers in {:?}",
        user_ids.len(),
        start_time.elapsed()
    );

    Ok(user_ids)
}

/// Seeds students and their profiles, then recounts batch enrollment
pub async fn seed_students(
    db: &PgPool,
    batches: &[SeededBatch],
    students_per_batch: usize,
    unassigned: usize,
    password_hash: &str,
) -> Result<Vec<UserId>, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!(
        "🎓 Seeding students ({} per batch, {} without a batch)...",
        students_per_batch, unassigned
    );

    let students = generate_students(batches, students_per_batch, unassigned, password_hash);

    let mut tx = db.begin().await?;
    let users: Vec<&UserSeed> = students.iter().map(|s| &s.user).collect();
    let user_ids = insert_users_chunked(&mut tx, &users).await?;

    let ids: Vec<Uuid> = user_ids.iter().map(|id| id.into_inner()).collect();
    let grades: Vec<String> = students.iter().map(|s| s.grade.clone()).collect();
    let class_types: Vec<&'static str> = students.iter().map(|s| s.class_type.as_str()).collect();
    let batch_ids: Vec<Option<Uuid>> = students
        .iter()
        .map(|s| s.batch_id.map(BatchId::into_inner))
        .collect();
    let phones: Vec<Option<String>> = students.iter().map(|s| s.user.phone.clone()).collect();

    sqlx::query(
        "INSERT INTO student_profiles
            (user_id, grade, class_type, batch_id, contact_number, student_id_number)
         SELECT v.user_id, v.grade, v.class_type::class_type, v.batch_id, v.phone,
                'STU' || LPAD(nextval('student_number_seq')::TEXT, 6, '0')
         FROM UNNEST($1::uuid[], $2::text[], $3::text[], $4::uuid[], $5::text[])
              AS v(user_id, grade, class_type, batch_id, phone)",
    )
    .bind(&ids)
    .bind(&grades)
    .bind(&class_types)
    .bind(&batch_ids)
    .bind(&phones)
    .execute(&mut *tx)
    .await?;

    recount_enrollment(&mut tx).await?;
    tx.commit().await?;

    println!(
        "   ✓ Inserted {} students in {:?}",
        user_ids.len(),
        start_time.elapsed()
    );

    Ok(user_ids)
}

/// Places teachers on batches that have none, one teacher per batch
pub async fn assign_teachers(
    db: &PgPool,
    teacher_ids: &[UserId],
    batches: &[SeededBatch],
) -> Result<usize, Box<dyn std::error::Error>> {
    let pairs: Vec<(Uuid, Uuid)> = batches
        .iter()
        .zip(teacher_ids.iter())
        .map(|(batch, teacher)| (batch.id.into_inner(), teacher.into_inner()))
        .collect();

    if pairs.is_empty() {
        return Ok(0);
    }

    let (batch_ids, teacher_ids): (Vec<Uuid>, Vec<Uuid>) = pairs.into_iter().unzip();

    let assigned = sqlx::query(
        "UPDATE batches b SET teacher_id = v.teacher_id, updated_at = NOW()
         FROM UNNEST($1::uuid[], $2::uuid[]) AS v(batch_id, teacher_id)
         WHERE b.id = v.batch_id AND b.teacher_id IS NULL
           AND NOT EXISTS (SELECT 1 FROM batches o WHERE o.teacher_id = v.teacher_id)",
    )
    .bind(&batch_ids)
    .bind(&teacher_ids)
    .execute(db)
    .await?
    .rows_affected();

    println!("   ✓ Assigned {} teachers to batches", assigned);
    Ok(assigned as usize)
}

/// Fetches active teachers that do not lead a batch yet
pub async fn get_free_teachers(db: &PgPool) -> Result<Vec<UserId>, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT u.id FROM users u
         WHERE u.role = 'teacher' AND u.status = 'active'
           AND NOT EXISTS (SELECT 1 FROM batches b WHERE b.teacher_id = u.id)
         ORDER BY u.name",
    )
    .fetch_all(db)
    .await
}

async fn insert_users_chunked(
    tx: &mut Transaction<'_, Postgres>,
    users: &[&UserSeed],
) -> Result<Vec<UserId>, Box<dyn std::error::Error>> {
    // 5 params per user
    const BATCH_SIZE: usize = 1000;

    let mut all_ids = Vec::with_capacity(users.len());
    for chunk in users.chunks(BATCH_SIZE) {
        all_ids.extend(insert_users_chunk(tx, chunk).await?);
    }
    Ok(all_ids)
}

async fn insert_users_chunk(
    tx: &mut Transaction<'_, Postgres>,
    users: &[&UserSeed],
) -> Result<Vec<UserId>, Box<dyn std::error::Error>> {
    if users.is_empty() {
        return Ok(Vec::new());
    }

    let mut query = String::from(
        "INSERT INTO users (name, email, phone, role, temp_password_hash, status) VALUES ",
    );

    for (i, _) in users.iter().enumerate() {
        if i > 0 {
            query.push_str(", ");
        }
        let param_idx = i * 5;
        query.push_str(&format!(
            "(${}, ${}, ${}, ${}, ${}, 'active')",
            param_idx + 1,
            param_idx + 2,
            param_idx + 3,
            param_idx + 4,
            param_idx + 5
        ));
    }

    query.push_str(" RETURNING id");

    let mut q = sqlx::query_scalar(&query);
    for user in users {
        q = q
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.phone)
            .bind(user.role)
            .bind(&user.password_hash);
    }

    let ids: Vec<UserId> = q.fetch_all(&mut **tx).await?;
    Ok(ids)
}

/// Sets every batch's `current_enrollment` to the number of profiles
/// pointing at it, raising capacity where the roster already exceeds it
pub async fn recount_enrollment(
    tx: &mut Transaction<'_, Postgres>,
) -> Result<u64, Box<dyn std::error::Error>> {
    let updated = sqlx::query(
        "UPDATE batches b
         SET current_enrollment = c.enrolled,
             capacity = GREATEST(b.capacity, c.enrolled),
             updated_at = NOW()
         FROM (
             SELECT b2.id, COUNT(sp.id)::INT AS enrolled
             FROM batches b2
             LEFT JOIN student_profiles sp ON sp.batch_id = b2.id
             GROUP BY b2.id
         ) c
         WHERE b.id = c.id
           AND (b.current_enrollment <> c.enrolled OR b.capacity < c.enrolled)",
    )
    .execute(&mut **tx)
    .await?
    .rows_affected();

    Ok(updated)
}

/// Clears all seeded users; profiles cascade and batches lose their teacher
pub async fn clear_users(db: &PgPool) -> Result<u64, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🗑️  Clearing seeded users...");

    let mut tx = db.begin().await?;

    let result = sqlx::query("DELETE FROM users WHERE email LIKE $1 AND role <> 'admin'")
        .bind(format!("%@{}", SEED_EMAIL_DOMAIN))
        .execute(&mut *tx)
        .await?
        .rows_affected();

    recount_enrollment(&mut tx).await?;
    tx.commit().await?;

    println!(
        "   ✓ Deleted {} users in {:?}",
        result,
        start_time.elapsed()
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(capacity: i32) -> SeededBatch {
        SeededBatch {
            id: BatchId::new(),
            capacity,
        }
    }

    #[test]
    fn test_generate_students_respects_capacity() {
        let batches = [batch(3), batch(10)];
        let students = generate_students(&batches, 5, 2, "hash");

        let in_first = students
            .iter()
            .filter(|s| s.batch_id == Some(batches[0].id))
            .count();
        let in_second = students
            .iter()
            .filter(|s| s.batch_id == Some(batches[1].id))
            .count();
        let unassigned = students.iter().filter(|s| s.batch_id.is_none()).count();

        assert_eq!(in_first, 3);
        assert_eq!(in_second, 5);
        assert_eq!(unassigned, 2);
    }

    #[test]
    fn test_generated_emails_use_seed_domain() {
        let teachers = generate_teachers(3, "hash");

        assert!(
            teachers
                .iter()
                .all(|t| t.user.email.ends_with("@example.com"))
        );
        assert!(teachers.iter().all(|t| t.user.role == UserRole::Teacher));
        assert_eq!(teachers[0].subjects.len(), 2);
    }
}
