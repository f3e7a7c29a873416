pub use nanapatha_models::class_sessions::*;
pub use nanapatha_models::schedule::*;
