//! Development data seeding.
//!
//! Generation runs in parallel with Rayon; inserts use multi-value or
//! `UNNEST` statements inside a transaction per stage. Seeded rows are
//! recognisable by the `@example.com` email domain or the [`SEED_MARKER`]
//! note, which is what the `clear_*` functions match on.

pub mod batches;
pub mod models;
pub mod registrations;
pub mod sessions;
pub mod users;

use chrono::Local;
use nanapatha_core::hash_password;
use nanapatha_models::{BatchId, ClassroomId};
use sqlx::PgPool;
use std::time::Instant;

pub use models::{PeopleConfig, SEED_MARKER, SeedConfig, SeededBatch};

/// Password given to every seeded account.
pub const SEED_PASSWORD: &str = "password123";

fn seed_password_hash() -> Result<String, Box<dyn std::error::Error>> {
    hash_password(SEED_PASSWORD)
        .map_err(|e| format!("Failed to hash password: {}", e.error).into())
}

/// Seeds batches, classrooms, teachers, students, this week's sessions and
/// a queue of pending registration requests
pub async fn seed_all(db: &PgPool, config: SeedConfig) -> Result<(), Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🌱 Seeding database...\n");

    let password_hash = seed_password_hash()?;

    let batches = batches::seed_batches(db, config.num_batches).await?;
    let classrooms = batches::seed_classrooms(db, config.num_classrooms).await?;

    let teacher_ids = users::seed_teachers(db, config.people.teachers, &password_hash).await?;
    users::assign_teachers(db, &teacher_ids, &batches).await?;

    let student_ids = users::seed_students(
        db,
        &batches,
        config.people.students_per_batch,
        config.people.unassigned_students,
        &password_hash,
    )
    .await?;

    sessions::seed_sessions(
        db,
        Local::now().date_naive(),
        &classrooms,
        config.sessions_per_batch,
    )
    .await?;

    let batch_ids: Vec<BatchId> = batches.iter().map(|b| b.id).collect();
    registrations::seed_registrations(db, config.people.registrations, &batch_ids).await?;

    println!("\n✅ Seeding complete in {:?}", start_time.elapsed());
    println!("   Batches:    {}", batches.len());
    println!("   Classrooms: {}", classrooms.len());
    println!("   Teachers:   {}", teacher_ids.len());
    println!("   Students:   {}", student_ids.len());
    println!("   Password for seeded accounts: {}", SEED_PASSWORD);

    Ok(())
}

/// Seeds only batches
pub async fn seed_batches_only(
    db: &PgPool,
    count: usize,
) -> Result<Vec<SeededBatch>, Box<dyn std::error::Error>> {
    batches::seed_batches(db, count).await
}

/// Seeds only classrooms
pub async fn seed_classrooms_only(
    db: &PgPool,
    count: usize,
) -> Result<Vec<ClassroomId>, Box<dyn std::error::Error>> {
    batches::seed_classrooms(db, count).await
}

/// Seeds teachers and places them on batches that have no teacher
pub async fn seed_teachers_only(
    db: &PgPool,
    count: usize,
) -> Result<usize, Box<dyn std::error::Error>> {
    let password_hash = seed_password_hash()?;
    let teacher_ids = users::seed_teachers(db, count, &password_hash).await?;

    let open_batches: Vec<SeededBatch> = sqlx::query_as::<_, (BatchId, i32)>(
        "SELECT id, capacity FROM batches WHERE is_active = TRUE AND teacher_id IS NULL ORDER BY created_at, name",
    )
    .fetch_all(db)
    .await?
    .into_iter()
    .map(|(id, capacity)| SeededBatch { id, capacity })
    .collect();

    users::assign_teachers(db, &teacher_ids, &open_batches).await?;
    Ok(teacher_ids.len())
}

/// Seeds students into the free seats of existing active batches
pub async fn seed_students_only(
    db: &PgPool,
    students_per_batch: usize,
    unassigned: usize,
) -> Result<usize, Box<dyn std::error::Error>> {
    let password_hash = seed_password_hash()?;

    let free_seats: Vec<SeededBatch> = sqlx::query_as::<_, (BatchId, i32)>(
        "SELECT id, capacity - current_enrollment FROM batches
         WHERE is_active = TRUE AND current_enrollment < capacity
         ORDER BY created_at, name",
    )
    .fetch_all(db)
    .await?
    .into_iter()
    .map(|(id, capacity)| SeededBatch { id, capacity })
    .collect();

    let ids =
        users::seed_students(db, &free_seats, students_per_batch, unassigned, &password_hash)
            .await?;
    Ok(ids.len())
}

/// Seeds this week's sessions for every active batch
pub async fn seed_sessions_only(
    db: &PgPool,
    per_batch: usize,
) -> Result<u64, Box<dyn std::error::Error>> {
    let classrooms = batches::get_active_classrooms(db).await?;
    sessions::seed_sessions(db, Local::now().date_naive(), &classrooms, per_batch).await
}

/// Seeds pending registration requests pointing at active batches
pub async fn seed_registrations_only(
    db: &PgPool,
    count: usize,
) -> Result<u64, Box<dyn std::error::Error>> {
    let batch_ids: Vec<BatchId> = batches::get_active_batches(db)
        .await?
        .into_iter()
        .map(|b| b.id)
        .collect();
    registrations::seed_registrations(db, count, &batch_ids).await
}

/// Clears everything the seeder created; admins and hand-made rows survive
pub async fn clear_all(db: &PgPool) -> Result<(), Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🧹 Clearing seeded data...\n");

    registrations::clear_registrations(db).await?;
    users::clear_users(db).await?;
    batches::clear_batches(db).await?;
    batches::clear_classrooms(db).await?;

    println!("\n✅ Cleared seeded data in {:?}", start_time.elapsed());
    Ok(())
}
