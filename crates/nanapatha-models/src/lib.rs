//! # Nanapatha Models
//!
//! Domain entities, request/response DTOs and the pure projections used by
//! the Nanapatha back office.
//!
//! # Modules
//!
//! - [`ids`]: typed identifiers
//! - [`enums`]: PostgreSQL-backed enumerations
//! - [`users`]: user accounts
//! - [`students`]: student profiles
//! - [`teachers`]: teacher profiles
//! - [`batches`]: class batches and rosters
//! - [`classrooms`]: physical rooms
//! - [`class_sessions`]: scheduled sessions
//! - [`schedule`]: the weekly and daily schedule projection
//! - [`registrations`]: registration requests
//! - [`dashboard`]: dashboard figures
//!
//! # Example
//!
//! ```ignore
//! use nanapatha_models::schedule::{ScheduleView, week_range};
//!
//! let (monday, sunday) = week_range(date);
//! let view = ScheduleView::project(date, time, sessions);
//! ```

pub mod batches;
pub mod class_sessions;
pub mod classrooms;
pub mod dashboard;
pub mod enums;
pub mod ids;
pub mod registrations;
pub mod schedule;
pub mod students;
pub mod teachers;
pub mod users;

pub use enums::{
    ClassType, PaymentStatus, RegistrationStatus, RegistrationType, SessionStatus, UserRole,
    UserStatus,
};
pub use ids::{
    BatchId, ClassSessionId, ClassroomId, RegistrationRequestId, StudentProfileId,
    TeacherProfileId, UserId,
};
