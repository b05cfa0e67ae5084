//! Error type shared by the Guampa crates

use thiserror::Error;

/// Result alias used throughout guampa-common
pub type Result<T> = std::result::Result<T, Error>;

/// Failures raised by persistence, configuration and import code
#[derive(Error, Debug)]
pub enum Error {
    /// Query or connection failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Filesystem failure (database directory, config file, import file)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Bootstrap configuration could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// A row referenced by id or name does not exist
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// Caller supplied data that violates an invariant
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Username already taken
    #[error("User already exists: {0}")]
    DuplicateUser(String),

    /// Stored timestamp text is not in the expected format
    #[error("Bad timestamp: {0}")]
    Timestamp(#[from] chrono::ParseError),
}

impl Error {
    /// Shorthand for a [`Error::NotFound`] keyed by a displayable value
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Error::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}
