//! Database initialization
//!
//! Opens (creating if needed) the SQLite file and creates every table
//! idempotently, so startup against a fresh or existing database is the
//! same code path.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Open the database at `db_path`, creating file, parent folder and schema
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Private in-memory database with the full schema
///
/// Limited to one connection: every SQLite `:memory:` connection is its own
/// database.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create all tables and indexes if they do not exist
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(pool)
        .await?;

    create_users_table(pool).await?;
    create_documents_table(pool).await?;
    create_sentences_table(pool).await?;
    create_translations_table(pool).await?;
    create_comments_table(pool).await?;
    create_tags_tables(pool).await?;

    Ok(())
}

async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            fullname TEXT NOT NULL DEFAULT '',
            password_hash TEXT NOT NULL,
            password_salt TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_documents_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            owner_id INTEGER REFERENCES users(id),
            source_language TEXT NOT NULL DEFAULT '',
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_sentences_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sentences (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            document_id INTEGER NOT NULL REFERENCES documents(id),
            ord INTEGER NOT NULL,
            text TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_sentences_document ON sentences(document_id, ord)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_translations_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS translations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            sentence_id INTEGER NOT NULL REFERENCES sentences(id),
            user_id INTEGER NOT NULL REFERENCES users(id),
            text TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_translations_sentence
        ON translations(sentence_id, created_at)
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_comments_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS comments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            sentence_id INTEGER NOT NULL REFERENCES sentences(id),
            user_id INTEGER NOT NULL REFERENCES users(id),
            text TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_comments_sentence ON comments(sentence_id, created_at)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Tags plus the document/tag association table
async fn create_tags_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tags (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            text TEXT NOT NULL UNIQUE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS document_tags (
            document_id INTEGER NOT NULL REFERENCES documents(id),
            tag_id INTEGER NOT NULL REFERENCES tags(id),
            PRIMARY KEY (document_id, tag_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_database_has_all_tables() {
        let pool = init_memory_database().await.unwrap();

        let tables: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT name FROM sqlite_master
            WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
            ORDER BY name
            "#,
        )
        .fetch_all(&pool)
        .await
        .unwrap();

        assert_eq!(
            tables,
            vec![
                "comments",
                "document_tags",
                "documents",
                "sentences",
                "tags",
                "translations",
                "users",
            ]
        );
    }

    #[tokio::test]
    async fn test_create_schema_is_idempotent() {
        let pool = init_memory_database().await.unwrap();
        create_schema(&pool).await.unwrap();
        create_schema(&pool).await.unwrap();
    }

    #[tokio::test]
    async fn test_foreign_keys_enforced() {
        let pool = init_memory_database().await.unwrap();

        let result =
            sqlx::query("INSERT INTO sentences (document_id, ord, text) VALUES (42, 0, 'orphan')")
                .execute(&pool)
                .await;

        assert!(result.is_err(), "Sentence without a document must be rejected");
    }
}
