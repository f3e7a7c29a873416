//! # Nanapatha CLI
//!
//! Database seeding and maintenance utilities for Nanapatha development.
//!
//! This library crate provides the seeding functionality used by the CLI binary.
//!
//! ## Usage
//!
//! ```ignore
//! use nanapatha_cli::seeder::{seed_all, SeedConfig};
//!
//! let config = SeedConfig::new(8); // 8 batches with defaults
//! seed_all(&pool, config).await?;
//! ```

pub mod admin;
pub mod seeder;
