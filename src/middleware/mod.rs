//! Request extractors for cross-cutting concerns.
//!
//! - [`actor`]: identifies the staff member behind a mutation
//!
//! # Example
//!
//! ```ignore
//! use crate::middleware::actor::Actor;
//!
//! async fn claim(actor: Actor, Path(id): Path<Uuid>) -> Result<Json<RegistrationRequest>, AppError> {
//!     RegistrationService::claim(&db, id.into(), actor.as_str()).await.map(Json)
//! }
//! ```

pub mod actor;

pub use actor::Actor;
