pub use nanapatha_models::classrooms::*;
