//! Seat and teaching-slot assignment for batches.
//!
//! Has no routes of its own; students, teachers, batches and registrations
//! all place people into batches through [`service::AssignmentService`].

pub mod service;

pub use service::AssignmentService;
