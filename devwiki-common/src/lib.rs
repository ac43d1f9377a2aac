//! # devwiki Common Library
//!
//! Shared code for the devwiki services:
//! - Error taxonomy
//! - Configuration loading
//! - Database initialization, migrations and models
//! - Repository traits and the SQLite store behind them

pub mod config;
pub mod db;
pub mod error;
pub mod patch;
pub mod repos;

pub use error::{Error, Result};
pub use patch::Patch;
