//! Batches: cohorts with a seat capacity and at most one teacher.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;

pub use model::*;
pub use router::init_batches_router;
