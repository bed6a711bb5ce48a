//! HTTP API layer for linkup.
//!
//! This crate provides the REST surface over the core services:
//!
//! - **Endpoints**: profiles, posts, follows, conversations, groups
//! - **Extractors**: the authenticated profile attached by the identity
//!   middleware
//! - **Middleware**: identity resolution and lazy profile provisioning
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{identity_middleware, AppState};
