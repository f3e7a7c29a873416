//! Registration requests: public submission and the review workflow
//! (claim, accept, reject, payment).

pub mod controller;
pub mod model;
pub mod router;
pub mod service;

pub use model::*;
pub use router::{init_public_registrations_router, init_registrations_router};
