pub use nanapatha_models::users::*;
