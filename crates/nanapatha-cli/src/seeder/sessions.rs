//! Class session seeding functionality.
//!
//! Spreads sessions over the current week so the schedule views have
//! something to show.

use chrono::{Duration, NaiveDate, NaiveTime};
use nanapatha_models::schedule::week_range;
use nanapatha_models::{BatchId, ClassroomId, UserId};
use sqlx::PgPool;
use std::time::Instant;

use super::models::SessionSeed;

const TOPICS: [&str; 6] = [
    "Revision",
    "New lesson",
    "Past paper discussion",
    "Practical",
    "Unit test",
    "Q&A",
];

/// Start hours of the daily slots; each slot runs for two hours.
const SLOT_HOURS: [u32; 4] = [8, 10, 14, 16];

/// Generates `per_batch` sessions per batch within the week of `reference`.
///
/// Batches rotate through weekdays and slots, and classrooms are handed out
/// round-robin.
pub fn generate_sessions(
    reference: NaiveDate,
    batches: &[(BatchId, Option<UserId>)],
    classrooms: &[ClassroomId],
    per_batch: usize,
) -> Vec<SessionSeed> {
    let (monday, _) = week_range(reference);
    let mut sessions = Vec::with_capacity(batches.len() * per_batch);

    for (batch_idx, &(batch_id, teacher_id)) in batches.iter().enumerate() {
        for n in 0..per_batch {
            let slot = batch_idx * per_batch + n;
            let day = (batch_idx + n * 2) % 6;
            let hour = SLOT_HOURS[slot % SLOT_HOURS.len()];

            let (Some(start_time), Some(end_time)) = (
                NaiveTime::from_hms_opt(hour, 0, 0),
                NaiveTime::from_hms_opt(hour + 2, 0, 0),
            ) else {
                continue;
            };

            sessions.push(SessionSeed {
                batch_id,
                teacher_id,
                classroom_id: (!classrooms.is_empty())
                    .then(|| classrooms[slot % classrooms.len()]),
                date: monday + Duration::days(day as i64),
                start_time,
                end_time,
                topic: TOPICS[slot % TOPICS.len()].to_string(),
            });
        }
    }

    sessions
}

/// Seeds class sessions for the given batches into the database
pub async fn seed_sessions(
    db: &PgPool,
    reference: NaiveDate,
    classrooms: &[ClassroomId],
    per_batch: usize,
) -> Result<u64, Box<dyn std::error::Error>> {
    let start_time = Instant::now();

    let batches: Vec<(BatchId, Option<UserId>)> = sqlx::query_as(
        "SELECT id, teacher_id FROM batches WHERE is_active = TRUE ORDER BY created_at, name",
    )
    .fetch_all(db)
    .await?;

    println!(
        "🗓️  Seeding {} sessions for {} batches...",
        batches.len() * per_batch,
        batches.len()
    );

    let sessions = generate_sessions(reference, &batches, classrooms, per_batch);
    if sessions.is_empty() {
        return Ok(0);
    }

    let mut query = String::from(
        "INSERT INTO class_sessions (batch_id, teacher_id, classroom_id, date, start_time, end_time, topic) VALUES ",
    );

    for (i, _) in sessions.iter().enumerate() {
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

    let mut q = sqlx::query(&query);
    for session in &sessions {
        q = q
            .bind(session.batch_id)
            .bind(session.teacher_id)
            .bind(session.classroom_id)
            .bind(session.date)
            .bind(session.start_time)
            .bind(session.end_time)
            .bind(&session.topic);
    }

    let inserted = q.execute(db).await?.rows_affected();

    println!(
        "   ✓ Inserted {} sessions in {:?}",
        inserted,
        start_time.elapsed()
    );

    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sessions_stay_within_the_week() {
        let reference = NaiveDate::from_ymd_opt(2024, 10, 10).expect("valid date");
        let batches: Vec<(BatchId, Option<UserId>)> =
            (0..5).map(|_| (BatchId::new(), None)).collect();

        let sessions = generate_sessions(reference, &batches, &[], 3);

        assert_eq!(sessions.len(), 15);
        let monday = NaiveDate::from_ymd_opt(2024, 10, 7).expect("valid date");
        let sunday = NaiveDate::from_ymd_opt(2024, 10, 13).expect("valid date");
        assert!(sessions.iter().all(|s| s.date >= monday && s.date <= sunday));
        assert!(sessions.iter().all(|s| s.start_time < s.end_time));
        assert!(sessions.iter().all(|s| s.classroom_id.is_none()));
    }

    #[test]
    fn test_classrooms_rotate() {
        let reference = NaiveDate::from_ymd_opt(2024, 10, 10).expect("valid date");
        let rooms = [ClassroomId::new(), ClassroomId::new()];
        let batches = [(BatchId::new(), Some(UserId::new()))];

        let sessions = generate_sessions(reference, &batches, &rooms, 2);

        assert_eq!(sessions[0].classroom_id, Some(rooms[0]));
        assert_eq!(sessions[1].classroom_id, Some(rooms[1]));
        assert_eq!(sessions[0].teacher_id, batches[0].1);
    }
}
