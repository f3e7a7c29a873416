//! # Nanapatha Core
//!
//! Foundational types shared by every crate of the Nanapatha back office:
//!
//! - [`errors`]: the application error type and its JSON rendering
//! - [`pagination`]: pagination parameters and response metadata
//! - [`password`]: credential hashing and temporary password generation
//! - [`serde`]: query-string deserialization helpers
//!
//! # Example
//!
//! ```ignore
//! use nanapatha_core::{AppError, PaginationParams};
//!
//! let error = AppError::capacity(anyhow::anyhow!("Batch is full"));
//! let params = PaginationParams::default();
//! let limit = params.limit();
//! ```

pub mod errors;
pub mod pagination;
pub mod password;
pub mod serde;

pub use errors::{AppError, ErrorKind, ErrorResponse};
pub use pagination::{PaginationMeta, PaginationParams};
pub use password::{generate_temporary_password, hash_password, verify_password};
