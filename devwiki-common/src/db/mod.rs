//! Database initialization, models and the SQLite store

pub mod init;
pub mod migrations;
pub mod models;
pub mod store;

pub use init::*;
pub use migrations::*;
pub use models::*;
pub use store::{SqliteStore, Store};
