//! API endpoints.

mod conversations;
mod follows;
mod groups;
mod posts;
mod profiles;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/profiles", profiles::router())
        .nest("/posts", posts::router())
        .nest("/follows", follows::router())
        .nest("/conversations", conversations::router())
        .nest("/groups", groups::router())
}

/// Default page size for listings.
pub(crate) const fn default_limit() -> u64 {
    20
}
