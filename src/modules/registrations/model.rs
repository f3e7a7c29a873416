pub use nanapatha_models::registrations::*;
