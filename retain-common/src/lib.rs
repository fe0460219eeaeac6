//! # Retain Common Library
//!
//! Shared code for the Retain attrition dashboard backend:
//! - Error types
//! - Configuration file loading
//! - Database initialization and table creation

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
