pub use nanapatha_models::batches::*;
