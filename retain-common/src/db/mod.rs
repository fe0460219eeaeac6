//! Database initialization and table creation

pub mod init;

pub use init::*;
