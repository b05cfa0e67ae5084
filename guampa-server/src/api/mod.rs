//! HTTP API handlers for guampa-server

pub mod auth;
pub mod documents;
pub mod health;
pub mod history;
pub mod mutations;
pub mod ui;

pub use auth::{current_user, json_login, json_logout};
pub use documents::{document_detail, documents_for_tag, list_documents, list_tags};
pub use health::health_routes;
pub use history::sentence_history;
pub use mutations::{add_comment, add_translation};
pub use ui::{login_routes, no_cache, not_found};

use crate::ApiError;

/// Parse a numeric path segment; anything else names no resource
pub(crate) fn parse_id(raw: &str, entity: &str) -> Result<i64, ApiError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ApiError::NotFound(format!("{} not found: {}", entity, raw)))
}
