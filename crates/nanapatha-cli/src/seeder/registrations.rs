//! Registration request seeding functionality.
//!
//! Fills the review queue with pending requests so the workflow can be
//! exercised without the public form.

use fake::Fake;
use fake::faker::name::en::*;
use nanapatha_models::BatchId;
use nanapatha_models::enums::{ClassType, PaymentStatus, RegistrationType};
use rayon::prelude::*;
use sqlx::PgPool;
use std::time::Instant;

use super::models::{RegistrationSeed, SEED_EMAIL_DOMAIN};

/// Generates pending requests; every fourth one comes from an existing
/// student and is already paid
pub fn generate_registrations(count: usize, batch_ids: &[BatchId]) -> Vec<RegistrationSeed> {
    (0..count)
        .into_par_iter()
        .map(|idx| {
            let first_name: String = FirstName().fake();
            let last_name: String = LastName().fake();
            let grade: u8 = (6..12).fake();
            let existing = idx % 4 == 3;

            let selected_batch_id = if batch_ids.is_empty() || existing {
                None
            } else {
                Some(batch_ids[idx % batch_ids.len()])
            };

            RegistrationSeed {
                name: format!("{} {}", first_name, last_name),
                email: format!(
                    "{}.{}+applicant{}@{}",
                    first_name.to_lowercase(),
                    last_name.to_lowercase(),
                    idx,
                    SEED_EMAIL_DOMAIN
                ),
                mobile: format!("07{}", (10_000_000..100_000_000).fake::<u32>()),
                grade: format!("Grade {}", grade),
                class_type: if idx % 3 == 0 {
                    ClassType::Online
                } else {
                    ClassType::Physical
                },
                selected_batch_id,
                student_id_number: existing.then(|| format!("OLD{:05}", idx)),
                registration_type: if existing {
                    RegistrationType::Existing
                } else {
                    RegistrationType::New
                },
                payment_status: if existing {
                    PaymentStatus::Paid
                } else {
                    PaymentStatus::Pending
                },
            }
        })
        .collect()
}

/// Seeds pending registration requests into the database
pub async fn seed_registrations(
    db: &PgPool,
    count: usize,
    batch_ids: &[BatchId],
) -> Result<u64, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("📝 Seeding {} registration requests...", count);

    let requests = generate_registrations(count, batch_ids);
    if requests.is_empty() {
        return Ok(0);
    }

    let mut query = String::from(
        "INSERT INTO registration_requests (name, email, mobile, grade, class_type, \
         selected_batch_id, student_id_number, registration_type, payment_status) VALUES ",
    );

    for (i, _) in requests.iter().enumerate() {
        if i > 0 {
            query.push_str(", ");
        }
        let param_idx = i * 9;
        query.push_str(&format!(
            "(${}, ${}, ${}, ${}, ${}, ${}, ${}, ${}, ${})",
            param_idx + 1,
            param_idx + 2,
            param_idx + 3,
            param_idx + 4,
            param_idx + 5,
            param_idx + 6,
            param_idx + 7,
            param_idx + 8,
            param_idx + 9
        ));
    }

    let mut q = sqlx::query(&query);
    for request in &requests {
        q = q
            .bind(&request.name)
            .bind(&request.email)
            .bind(&request.mobile)
            .bind(&request.grade)
            .bind(request.class_type)
            .bind(request.selected_batch_id)
            .bind(&request.student_id_number)
            .bind(request.registration_type)
            .bind(request.payment_status);
    }

    let inserted = q.execute(db).await?.rows_affected();

    println!(
        "   ✓ Inserted {} registration requests in {:?}",
        inserted,
        start_time.elapsed()
    );

    Ok(inserted)
}

/// Clears seeded registration requests
pub async fn clear_registrations(db: &PgPool) -> Result<u64, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🗑️  Clearing seeded registration requests...");

    let result = sqlx::query("DELETE FROM registration_requests WHERE email LIKE $1")
        .bind(format!("%@{}", SEED_EMAIL_DOMAIN))
        .execute(db)
        .await?
        .rows_affected();

    println!(
        "   ✓ Deleted {} registration requests in {:?}",
        result,
        start_time.elapsed()
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_existing_requests_are_paid_without_batch() {
        let batches = [BatchId::new(), BatchId::new()];
        let requests = generate_registrations(8, &batches);

        for request in requests
            .iter()
            .filter(|r| r.registration_type == RegistrationType::Existing)
        {
            assert_eq!(request.payment_status, PaymentStatus::Paid);
            assert!(request.selected_batch_id.is_none());
            assert!(request.student_id_number.is_some());
        }
        assert_eq!(
            requests
                .iter()
                .filter(|r| r.registration_type == RegistrationType::Existing)
                .count(),
            2
        );
    }

    #[test]
    fn test_new_requests_pick_a_batch_when_available() {
        let batches = [BatchId::new()];
        let requests = generate_registrations(3, &batches);

        assert!(
            requests
                .iter()
                .all(|r| r.selected_batch_id == Some(batches[0]))
        );
        assert!(generate_registrations(3, &[])
            .iter()
            .all(|r| r.selected_batch_id.is_none()));
    }
}
