//! Class sessions and the weekly/daily schedule view.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;

pub use model::*;
pub use router::{init_schedule_router, init_sessions_router};
