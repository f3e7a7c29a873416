pub use nanapatha_models::teachers::*;
