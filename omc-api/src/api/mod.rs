//! HTTP API handlers for omc-api

pub mod auth;
pub mod health;
pub mod validate;

pub use auth::auth_middleware;
pub use health::health_routes;
pub use validate::{validate_beatmaps, validate_metadata};
