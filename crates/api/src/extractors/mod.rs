//! Custom Axum extractors.

pub mod auth;
pub mod query;

pub use auth::AuthUser;
pub use query::ValidatedQuery;
