//! Batch and classroom seeding functionality.
//!
//! Provides functions for generating and inserting fake batches and
//! classrooms into the database.

use chrono::{Duration, Local};
use fake::Fake;
use fake::faker::address::en::*;
use nanapatha_models::enums::ClassType;
use nanapatha_models::{BatchId, ClassroomId};
use rayon::prelude::*;
use sqlx::{PgPool, Postgres, Transaction};
use std::time::Instant;

use super::models::{BatchSeed, ClassroomSeed, SEED_MARKER, SeededBatch};

const SUBJECTS: [&str; 6] = [
    "Mathematics",
    "Science",
    "English",
    "ICT",
    "Sinhala",
    "Commerce",
];

const GRADES: [&str; 6] = [
    "Grade 6", "Grade 7", "Grade 8", "Grade 9", "Grade 10", "Grade 11",
];

const CLASS_TYPES: [ClassType; 3] = [ClassType::Physical, ClassType::Online, ClassType::Both];

/// Generates batch data in parallel using Rayon
pub fn generate_batches(count: usize) -> Vec<BatchSeed> {
    let today = Local::now().date_naive();

    (0..count)
        .into_par_iter()
        .map(|i| {
            let grade = GRADES[i % GRADES.len()];
            let subject = SUBJECTS[(i / GRADES.len() + i) % SUBJECTS.len()];
            let section = (b'A' + (i / (GRADES.len() * SUBJECTS.len()) % 26) as u8) as char;
            let weeks_ago: i64 = (0..8).fake();

            BatchSeed {
                name: format!("{} {} {}", grade, subject, section),
                grade: grade.to_string(),
                subject: subject.to_string(),
                capacity: (15..40).fake(),
                class_type: CLASS_TYPES[i % CLASS_TYPES.len()],
                start_date: Some(today - Duration::weeks(weeks_ago)),
            }
        })
        .collect()
}

/// Generates classroom data in parallel using Rayon
pub fn generate_classrooms(count: usize) -> Vec<ClassroomSeed> {
    (0..count)
        .into_par_iter()
        .map(|i| {
            let street: String = StreetName().fake();
            let building: String = BuildingNumber().fake();

            ClassroomSeed {
                name: format!("Hall {}", i + 1),
                capacity: (20..60).fake(),
                location: format!("{} {}, floor {}", building, street, i % 3 + 1),
            }
        })
        .collect()
}

/// Seeds batches into the database
pub async fn seed_batches(
    db: &PgPool,
    count: usize,
) -> Result<Vec<SeededBatch>, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("📚 Seeding {} batches...", count);

    let batches = generate_batches(count);
    let ids = insert_batches_batch(db, &batches).await?;

    println!(
        "   ✓ Inserted {} batches in {:?}",
        ids.len(),
        start_time.elapsed()
    );

    Ok(ids
        .into_iter()
        .zip(batches.iter())
        .map(|(id, seed)| SeededBatch {
            id,
            capacity: seed.capacity,
        })
        .collect())
}

/// Seeds classrooms into the database
pub async fn seed_classrooms(
    db: &PgPool,
    count: usize,
) -> Result<Vec<ClassroomId>, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🏫 Seeding {} classrooms...", count);

    let classrooms = generate_classrooms(count);
    let ids = insert_classrooms_batch(db, &classrooms).await?;

    println!(
        "   ✓ Inserted {} classrooms in {:?}",
        ids.len(),
        start_time.elapsed()
    );

    Ok(ids)
}

/// Inserts batches in chunks using multi-value INSERT statements
pub async fn insert_batches_batch(
    db: &PgPool,
    batches: &[BatchSeed],
) -> Result<Vec<BatchId>, Box<dyn std::error::Error>> {
    let mut tx = db.begin().await?;

    // 7 params per batch
    const BATCH_SIZE: usize = 500;
    let mut all_ids = Vec::with_capacity(batches.len());

    for chunk in batches.chunks(BATCH_SIZE) {
        let ids = insert_batches_chunk(&mut tx, chunk).await?;
        all_ids.extend(ids);
    }

    tx.commit().await?;
    Ok(all_ids)
}

async fn insert_batches_chunk(
    tx: &mut Transaction<'_, Postgres>,
    batches: &[BatchSeed],
) -> Result<Vec<BatchId>, Box<dyn std::error::Error>> {
    if batches.is_empty() {
        return Ok(Vec::new());
    }

    let mut query = String::from(
        "INSERT INTO batches (name, grade, subject, capacity, class_type, start_date, notes) VALUES ",
    );

    for (i, _) in batches.iter().enumerate() {
        if i > 0 {
            query.push_str(", ");
        }
        let param_idx = i * 7;
        query.push_str(&format!(
            "(${}, ${}, ${}, ${}, ${}, ${}, ${})",
            param_idx + 1,
            param_idx + 2,
            param_idx + 3,
            param_idx + 4,
            param_idx + 5,
            param_idx + 6,
            param_idx + 7
        ));
    }

    query.push_str(" RETURNING id");

    let mut q = sqlx::query_scalar(&query);
    for batch in batches {
        q = q
            .bind(&batch.name)
            .bind(&batch.grade)
            .bind(&batch.subject)
            .bind(batch.capacity)
            .bind(batch.class_type)
            .bind(batch.start_date)
            .bind(SEED_MARKER);
    }

    let ids: Vec<BatchId> = q.fetch_all(&mut **tx).await?;
    Ok(ids)
}

/// Inserts classrooms in chunks using multi-value INSERT statements
pub async fn insert_classrooms_batch(
    db: &PgPool,
    classrooms: &[ClassroomSeed],
) -> Result<Vec<ClassroomId>, Box<dyn std::error::Error>> {
    if classrooms.is_empty() {
        return Ok(Vec::new());
    }

    let mut query =
        String::from("INSERT INTO classrooms (name, capacity, location, notes) VALUES ");

    for (i, _) in classrooms.iter().enumerate() {
        if i > 0 {
            query.push_str(", ");
        }
        let param_idx = i * 4;
        query.push_str(&format!(
            "(${}, ${}, ${}, ${})",
            param_idx + 1,
            param_idx + 2,
            param_idx + 3,
            param_idx + 4
        ));
    }

    query.push_str(" RETURNING id");

    let mut q = sqlx::query_scalar(&query);
    for classroom in classrooms {
        q = q
            .bind(&classroom.name)
            .bind(classroom.capacity)
            .bind(&classroom.location)
            .bind(SEED_MARKER);
    }

    let ids: Vec<ClassroomId> = q.fetch_all(db).await?;
    Ok(ids)
}

/// Fetches active batches with their capacity, oldest first
pub async fn get_active_batches(db: &PgPool) -> Result<Vec<SeededBatch>, sqlx::Error> {
    let rows: Vec<(BatchId, i32)> = sqlx::query_as(
        "SELECT id, capacity FROM batches WHERE is_active = TRUE ORDER BY created_at, name",
    )
    .fetch_all(db)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, capacity)| SeededBatch { id, capacity })
        .collect())
}

/// Fetches active classroom ids
pub async fn get_active_classrooms(db: &PgPool) -> Result<Vec<ClassroomId>, sqlx::Error> {
    sqlx::query_scalar("SELECT id FROM classrooms WHERE is_active = TRUE ORDER BY name")
        .fetch_all(db)
        .await
}

/// Clears seeded batches; sessions cascade and student seats are released
pub async fn clear_batches(db: &PgPool) -> Result<u64, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🗑️  Clearing seeded batches...");

    let result = sqlx::query("DELETE FROM batches WHERE notes = $1")
        .bind(SEED_MARKER)
        .execute(db)
        .await?
        .rows_affected();

    println!(
        "   ✓ Deleted {} batches in {:?}",
        result,
        start_time.elapsed()
    );

    Ok(result)
}

/// Clears seeded classrooms
pub async fn clear_classrooms(db: &PgPool) -> Result<u64, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🗑️  Clearing seeded classrooms...");

    let result = sqlx::query("DELETE FROM classrooms WHERE notes = $1")
        .bind(SEED_MARKER)
        .execute(db)
        .await?
        .rows_affected();

    println!(
        "   ✓ Deleted {} classrooms in {:?}",
        result,
        start_time.elapsed()
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_batches_names_are_unique() {
        let batches = generate_batches(40);
        let mut names: Vec<&str> = batches.iter().map(|b| b.name.as_str()).collect();
        names.sort();
        names.dedup();

        assert_eq!(names.len(), 40);
    }

    #[test]
    fn test_generate_batches_capacity_in_range() {
        for batch in generate_batches(20) {
            assert!((15..40).contains(&batch.capacity));
            assert!(batch.start_date.is_some());
        }
    }

    #[test]
    fn test_generate_classrooms() {
        let rooms = generate_classrooms(3);

        assert_eq!(rooms.len(), 3);
        assert_eq!(rooms[0].name, "Hall 1");
        assert!(rooms.iter().all(|r| r.capacity >= 20));
    }
}
