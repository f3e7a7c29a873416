//! Back office landing figures.

pub mod controller;
pub mod router;
pub mod service;

pub use router::init_dashboard_router;
