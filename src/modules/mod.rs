pub mod assignments;
pub mod batches;
pub mod classrooms;
pub mod dashboard;
pub mod registrations;
pub mod schedule;
pub mod students;
pub mod teachers;
pub mod users;
