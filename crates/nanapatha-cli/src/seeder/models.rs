//! Data models for database seeding configuration.
//!
//! This module contains configuration structures for controlling how
//! development data is generated during seeding operations.

use chrono::{NaiveDate, NaiveTime};
use nanapatha_models::enums::{ClassType, PaymentStatus, RegistrationType, UserRole};
use nanapatha_models::{BatchId, ClassroomId, UserId};

/// Marker stored in `notes` of seeded batches and classrooms so `clear-seed`
/// can find them again.
pub const SEED_MARKER: &str = "seeded by nanapatha-cli";

/// Domain shared by every seeded email address.
pub const SEED_EMAIL_DOMAIN: &str = "example.com";

/// Seed data for creating a batch.
pub struct BatchSeed {
    pub name: String,
    pub grade: String,
    pub subject: String,
    pub capacity: i32,
    pub class_type: ClassType,
    pub start_date: Option<NaiveDate>,
}

/// Seed data for creating a classroom.
pub struct ClassroomSeed {
    pub name: String,
    pub capacity: i32,
    pub location: String,
}

/// Seed data for creating a user account.
pub struct UserSeed {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub password_hash: String,
}

/// Seed data for a student: the account plus the profile fields.
pub struct StudentSeed {
    pub user: UserSeed,
    pub grade: String,
    pub class_type: ClassType,
    pub batch_id: Option<BatchId>,
}

/// Seed data for a teacher: the account plus the subjects taught.
pub struct TeacherSeed {
    pub user: UserSeed,
    pub subjects: Vec<String>,
}

/// Seed data for a registration request awaiting review.
pub struct RegistrationSeed {
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub grade: String,
    pub class_type: ClassType,
    pub selected_batch_id: Option<BatchId>,
    pub student_id_number: Option<String>,
    pub registration_type: RegistrationType,
    pub payment_status: PaymentStatus,
}

/// Seed data for a class session.
pub struct SessionSeed {
    pub batch_id: BatchId,
    pub teacher_id: Option<UserId>,
    pub classroom_id: Option<ClassroomId>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub topic: String,
}

/// Seeded batch as needed by the later stages.
#[derive(Clone, Copy)]
pub struct SeededBatch {
    pub id: BatchId,
    pub capacity: i32,
}

/// Configuration for the people seeded around the batches.
#[derive(Clone)]
pub struct PeopleConfig {
    pub teachers: usize,
    pub students_per_batch: usize,
    pub unassigned_students: usize,
    pub registrations: usize,
}

impl Default for PeopleConfig {
    fn default() -> Self {
        Self {
            teachers: 6,
            students_per_batch: 15,
            unassigned_students: 10,
            registrations: 12,
        }
    }
}

/// Complete configuration for database seeding.
#[derive(Clone)]
pub struct SeedConfig {
    pub num_batches: usize,
    pub num_classrooms: usize,
    pub sessions_per_batch: usize,
    pub people: PeopleConfig,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            num_batches: 8,
            num_classrooms: 4,
            sessions_per_batch: 2,
            people: PeopleConfig::default(),
        }
    }
}

impl SeedConfig {
    /// Creates a new seed configuration with the specified number of batches.
    pub fn new(num_batches: usize) -> Self {
        Self {
            num_batches,
            ..Default::default()
        }
    }

    pub fn with_classrooms(mut self, num_classrooms: usize) -> Self {
        self.num_classrooms = num_classrooms;
        self
    }

    pub fn with_sessions(mut self, sessions_per_batch: usize) -> Self {
        self.sessions_per_batch = sessions_per_batch;
        self
    }

    pub fn with_people(mut self, people: PeopleConfig) -> Self {
        self.people = people;
        self
    }

    /// Upper bound on seeded students; batches smaller than
    /// `students_per_batch` take fewer.
    pub fn max_students(&self) -> usize {
        self.num_batches * self.people.students_per_batch + self.people.unassigned_students
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_students_counts_unassigned() {
        let config = SeedConfig::new(4).with_people(PeopleConfig {
            teachers: 2,
            students_per_batch: 10,
            unassigned_students: 5,
            registrations: 0,
        });

        assert_eq!(config.max_students(), 45);
    }

    #[test]
    fn test_builder_overrides() {
        let config = SeedConfig::new(3).with_classrooms(7).with_sessions(4);

        assert_eq!(config.num_batches, 3);
        assert_eq!(config.num_classrooms, 7);
        assert_eq!(config.sessions_per_batch, 4);
        assert_eq!(config.people.teachers, 6);
    }
}
