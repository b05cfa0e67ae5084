//! Sentence lookup plus translation and comment history

use guampa_common::db::{Comment, Sentence, Translation};
use guampa_common::{Error, Result, Timestamp};
use sqlx::SqlitePool;

pub async fn get_sentence(pool: &SqlitePool, id: i64) -> Result<Option<Sentence>> {
    let sentence = sqlx::query_as::<_, Sentence>(
        "SELECT id, document_id, ord, text FROM sentences WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(sentence)
}

/// A history row together with its author's username
#[derive(Debug, Clone)]
pub struct Authored<T> {
    pub item: T,
    pub username: String,
}

/// Columns shared by the comment and translation history queries
type HistoryRow = (i64, i64, i64, String, Timestamp, String);

/// Comments on a sentence with their authors, oldest first
pub async fn comments_with_users(
    pool: &SqlitePool,
    sentence_id: i64,
) -> Result<Vec<Authored<Comment>>> {
    let rows = sqlx::query_as::<_, HistoryRow>(
        r#"
        SELECT c.id, c.sentence_id, c.user_id, c.text, c.created_at, u.username
        FROM comments c
        JOIN users u ON u.id = c.user_id
        WHERE c.sentence_id = ?
        ORDER BY c.created_at ASC, c.id ASC
        "#,
    )
    .bind(sentence_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, sentence_id, user_id, text, created_at, username)| Authored {
            item: Comment {
                id,
                sentence_id,
                user_id,
                text,
                created_at,
            },
            username,
        })
        .collect())
}

/// Translations of a sentence with their authors, oldest first
pub async fn translations_with_users(
    pool: &SqlitePool,
    sentence_id: i64,
) -> Result<Vec<Authored<Translation>>> {
    let rows = sqlx::query_as::<_, HistoryRow>(
        r#"
        SELECT t.id, t.sentence_id, t.user_id, t.text, t.created_at, u.username
        FROM translations t
        JOIN users u ON u.id = t.user_id
        WHERE t.sentence_id = ?
        ORDER BY t.created_at ASC, t.id ASC
        "#,
    )
    .bind(sentence_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, sentence_id, user_id, text, created_at, username)| Authored {
            item: Translation {
                id,
                sentence_id,
                user_id,
                text,
                created_at,
            },
            username,
        })
        .collect())
}

/// Record a translation of `sentence_id` by `user_id`, stamped now
pub async fn save_translation(
    pool: &SqlitePool,
    user_id: i64,
    document_id: i64,
    sentence_id: i64,
    text: &str,
) -> Result<i64> {
    save_translation_at(pool, user_id, document_id, sentence_id, text, Timestamp::now()).await
}

/// [`save_translation`] with an explicit timestamp
///
/// The sentence must exist and belong to `document_id`.
pub async fn save_translation_at(
    pool: &SqlitePool,
    user_id: i64,
    document_id: i64,
    sentence_id: i64,
    text: &str,
    created_at: Timestamp,
) -> Result<i64> {
    let sentence = require_sentence(pool, sentence_id).await?;
    if sentence.document_id != document_id {
        return Err(Error::InvalidInput(format!(
            "sentence {} belongs to document {}, not {}",
            sentence_id, sentence.document_id, document_id
        )));
    }

    let id = sqlx::query(
        "INSERT INTO translations (sentence_id, user_id, text, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(sentence_id)
    .bind(user_id)
    .bind(text)
    .bind(created_at.to_db_string())
    .execute(pool)
    .await?
    .last_insert_rowid();

    Ok(id)
}

/// Record a comment on `sentence_id` by `user_id`, stamped now
pub async fn save_comment(
    pool: &SqlitePool,
    user_id: i64,
    sentence_id: i64,
    text: &str,
) -> Result<i64> {
    save_comment_at(pool, user_id, sentence_id, text, Timestamp::now()).await
}

pub async fn save_comment_at(
    pool: &SqlitePool,
    user_id: i64,
    sentence_id: i64,
    text: &str,
    created_at: Timestamp,
) -> Result<i64> {
    require_sentence(pool, sentence_id).await?;

    let id = sqlx::query(
        "INSERT INTO comments (sentence_id, user_id, text, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(sentence_id)
    .bind(user_id)
    .bind(text)
    .bind(created_at.to_db_string())
    .execute(pool)
    .await?
    .last_insert_rowid();

    Ok(id)
}

async fn require_sentence(pool: &SqlitePool, sentence_id: i64) -> Result<Sentence> {
    get_sentence(pool, sentence_id)
        .await?
        .ok_or_else(|| Error::not_found("Sentence", sentence_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_user, import_document, NewDocument};
    use guampa_common::db::init_memory_database;

    async fn fixture() -> (SqlitePool, i64, i64, i64) {
        let pool = init_memory_database().await.unwrap();
        let user = create_user(&pool, "alex", "", "pw").await.unwrap();
        let doc = import_document(
            &pool,
            &NewDocument {
                title: "A".into(),
                source_language: "es".into(),
                sentences: vec!["uno".into()],
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let sentence_id: i64 = sqlx::query_scalar("SELECT id FROM sentences WHERE document_id = ?")
            .bind(doc)
            .fetch_one(&pool)
            .await
            .unwrap();
        (pool, user.id, doc, sentence_id)
    }

    #[tokio::test]
    async fn test_translation_history_carries_username() {
        let (pool, user, doc, sentence) = fixture().await;
        save_translation(&pool, user, doc, sentence, "one").await.unwrap();

        let rows = translations_with_users(&pool, sentence).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].username, "alex");
        assert_eq!(rows[0].item.text, "one");
    }

    #[tokio::test]
    async fn test_comments_ordered_by_time() {
        let (pool, user, _doc, sentence) = fixture().await;
        let second = "2013-01-02 00:00:00.000000".parse().unwrap();
        save_comment_at(&pool, user, sentence, "second", second)
            .await
            .unwrap();
        let first = "2013-01-01 00:00:00.000000".parse().unwrap();
        save_comment_at(&pool, user, sentence, "first", first)
            .await
            .unwrap();

        let rows = comments_with_users(&pool, sentence).await.unwrap();
        let texts: Vec<_> = rows.iter().map(|r| r.item.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_translation_for_wrong_document_rejected() {
        let (pool, user, doc, sentence) = fixture().await;

        let err = save_translation(&pool, user, doc + 1, sentence, "x").await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM translations")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_unknown_sentence_rejected() {
        let (pool, user, doc, _sentence) = fixture().await;

        let err = save_translation(&pool, user, doc, 999, "x").await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
        let err = save_comment(&pool, user, 999, "x").await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }
}
