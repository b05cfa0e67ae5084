//! Query layer for guampa-server
//!
//! Free functions over a [`sqlx::SqlitePool`]; each call borrows a pooled
//! connection only for the statements it runs.

pub mod documents;
pub mod sentences;
pub mod users;

pub use documents::{
    document_with_latest_translations, documents_for_tagname, get_document, import_document,
    list_documents, list_tags, NewDocument, SentenceWithTranslation,
};
pub use sentences::{
    comments_with_users, get_sentence, save_comment, save_comment_at, save_translation,
    save_translation_at, translations_with_users, Authored,
};
pub use users::{authenticate, create_user, get_user, lookup_username, LoginOutcome};
