//! Row models
//!
//! One struct per table; handlers serialize their own response shapes, so
//! these only derive what persistence and logging need.

use serde::Serialize;
use sqlx::FromRow;

use crate::Timestamp;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub fullname: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing)]
    pub password_salt: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Document {
    pub id: i64,
    pub title: String,
    /// Uploading user; NULL for documents loaded without an owner
    pub owner_id: Option<i64>,
    /// Source language code, e.g. "es"
    pub source_language: String,
}

/// Atomic translation unit; `ord` is its position within the document
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Sentence {
    pub id: i64,
    pub document_id: i64,
    pub ord: i64,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Translation {
    pub id: i64,
    pub sentence_id: i64,
    pub user_id: i64,
    pub text: String,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Comment {
    pub id: i64,
    pub sentence_id: i64,
    pub user_id: i64,
    pub text: String,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Tag {
    pub id: i64,
    pub text: String,
}
