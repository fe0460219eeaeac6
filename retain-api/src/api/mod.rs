//! HTTP API handlers for retain-api

pub mod health;
pub mod import;

pub use health::health_routes;
pub use import::import_routes;
