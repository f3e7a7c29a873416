pub use nanapatha_models::students::*;
