//! Common utilities and shared types for linkup.
//!
//! This crate provides foundational components used across all linkup crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//! - **Pair ordering**: Canonical ordering for unordered identifier pairs
//!
//! # Example
//!
//! ```no_run
//! use linkup_common::{Config, IdGenerator, AppResult};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     let id = id_gen.generate();
//!     println!("Generated ID: {}", id);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;
pub mod pair;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
pub use pair::canonical_pair;
