//! # Nanapatha Config
//!
//! Configuration structures loaded from environment variables:
//!
//! - [`cors`]: allowed origins for the admin frontend
//! - [`server`]: listen address, metrics port and startup behaviour
//!
//! # Example
//!
//! ```ignore
//! use nanapatha_config::{CorsConfig, ServerConfig};
//!
//! let cors_config = CorsConfig::from_env();
//! let server_config = ServerConfig::from_env();
//! ```

pub mod cors;
pub mod server;

pub use cors::CorsConfig;
pub use server::ServerConfig;
