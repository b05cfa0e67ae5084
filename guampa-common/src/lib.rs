//! # Guampa Common Library
//!
//! Shared code for the Guampa translation service:
//! - Database schema initialization and row models
//! - Bootstrap configuration loading
//! - Password hashing
//! - Timestamp storage format
//! - Sentence segmentation for document import

pub mod config;
pub mod db;
pub mod error;
pub mod password;
pub mod segment;
pub mod time;

pub use error::{Error, Result};
pub use time::Timestamp;
