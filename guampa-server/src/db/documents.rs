//! Document, tag and document-detail queries

use guampa_common::db::{Document, Sentence, Tag, Translation};
use guampa_common::{Error, Result};
use sqlx::{Row, SqlitePool};
use tracing::info;

const DOCUMENT_COLUMNS: &str = "d.id, d.title, d.owner_id, d.source_language";

/// All documents in upload order
pub async fn list_documents(pool: &SqlitePool) -> Result<Vec<Document>> {
    let docs = sqlx::query_as::<_, Document>(&format!(
        "SELECT {} FROM documents d ORDER BY d.id",
        DOCUMENT_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    Ok(docs)
}

/// Documents carrying the tag `tagname`; empty for an unknown tag
pub async fn documents_for_tagname(pool: &SqlitePool, tagname: &str) -> Result<Vec<Document>> {
    let docs = sqlx::query_as::<_, Document>(&format!(
        r#"
        SELECT {}
        FROM documents d
        JOIN document_tags dt ON dt.document_id = d.id
        JOIN tags t ON t.id = dt.tag_id
        WHERE t.text = ?
        ORDER BY d.id
        "#,
        DOCUMENT_COLUMNS
    ))
    .bind(tagname)
    .fetch_all(pool)
    .await?;

    Ok(docs)
}

/// Every tag, alphabetically
pub async fn list_tags(pool: &SqlitePool) -> Result<Vec<Tag>> {
    let tags = sqlx::query_as::<_, Tag>("SELECT id, text FROM tags ORDER BY text")
        .fetch_all(pool)
        .await?;

    Ok(tags)
}

pub async fn get_document(pool: &SqlitePool, id: i64) -> Result<Option<Document>> {
    let doc = sqlx::query_as::<_, Document>(&format!(
        "SELECT {} FROM documents d WHERE d.id = ?",
        DOCUMENT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(doc)
}

/// A sentence paired with its active translation, if any
#[derive(Debug, Clone)]
pub struct SentenceWithTranslation {
    pub sentence: Sentence,
    pub translation: Option<Translation>,
}

/// Sentences of `document_id` in order, each with its most recent translation
///
/// The outer join yields one row per (sentence, translation) pair, newest
/// translation first within each sentence; [`keep_latest`] reduces that to
/// one row per sentence.
pub async fn document_with_latest_translations(
    pool: &SqlitePool,
    document_id: i64,
) -> Result<Vec<SentenceWithTranslation>> {
    let rows = sqlx::query(
        r#"
        SELECT s.id, s.document_id, s.ord, s.text,
               t.id AS t_id, t.user_id AS t_user_id, t.text AS t_text, t.created_at AS t_created_at
        FROM sentences s
        LEFT JOIN translations t ON t.sentence_id = s.id
        WHERE s.document_id = ?
        ORDER BY s.ord ASC, s.id ASC, t.created_at DESC, t.id DESC
        "#,
    )
    .bind(document_id)
    .fetch_all(pool)
    .await?;

    let mut pairs = Vec::with_capacity(rows.len());
    for row in rows {
        let sentence = Sentence {
            id: row.try_get("id")?,
            document_id: row.try_get("document_id")?,
            ord: row.try_get("ord")?,
            text: row.try_get("text")?,
        };
        let translation = match row.try_get::<Option<i64>, _>("t_id")? {
            Some(id) => Some(Translation {
                id,
                sentence_id: sentence.id,
                user_id: row.try_get("t_user_id")?,
                text: row.try_get("t_text")?,
                created_at: row.try_get("t_created_at")?,
            }),
            None => None,
        };
        pairs.push(SentenceWithTranslation {
            sentence,
            translation,
        });
    }

    Ok(keep_latest(pairs))
}

/// Keep the first row seen for each sentence id
///
/// Input must already be grouped by sentence with the preferred
/// translation first.
pub fn keep_latest(rows: Vec<SentenceWithTranslation>) -> Vec<SentenceWithTranslation> {
    let mut out: Vec<SentenceWithTranslation> = Vec::with_capacity(rows.len());
    for row in rows {
        if out.last().map(|prev| prev.sentence.id) == Some(row.sentence.id) {
            continue;
        }
        out.push(row);
    }
    out
}

/// Input for [`import_document`]
#[derive(Debug, Clone, Default)]
pub struct NewDocument {
    pub title: String,
    pub owner_id: Option<i64>,
    pub source_language: String,
    pub sentences: Vec<String>,
    pub tags: Vec<String>,
}

/// Store a document with its sentences and tags in one transaction
///
/// Tags are created on first use. Returns the new document id.
pub async fn import_document(pool: &SqlitePool, doc: &NewDocument) -> Result<i64> {
    if doc.title.trim().is_empty() {
        return Err(Error::InvalidInput("document title must not be empty".to_string()));
    }
    if doc.sentences.is_empty() {
        return Err(Error::InvalidInput(format!(
            "document '{}' has no sentences",
            doc.title
        )));
    }

    let mut tx = pool.begin().await?;

    let document_id = sqlx::query(
        "INSERT INTO documents (title, owner_id, source_language) VALUES (?, ?, ?)",
    )
    .bind(&doc.title)
    .bind(doc.owner_id)
    .bind(&doc.source_language)
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    for (ord, text) in doc.sentences.iter().enumerate() {
        sqlx::query("INSERT INTO sentences (document_id, ord, text) VALUES (?, ?, ?)")
            .bind(document_id)
            .bind(ord as i64)
            .bind(text)
            .execute(&mut *tx)
            .await?;
    }

    for tag in &doc.tags {
        let tag = tag.trim();
        if tag.is_empty() {
            continue;
        }
        sqlx::query("INSERT OR IGNORE INTO tags (text) VALUES (?)")
            .bind(tag)
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO document_tags (document_id, tag_id)
            SELECT ?, id FROM tags WHERE text = ?
            "#,
        )
        .bind(document_id)
        .bind(tag)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    info!(
        "Imported document {} '{}' ({} sentences, {} tags)",
        document_id,
        doc.title,
        doc.sentences.len(),
        doc.tags.len()
    );

    Ok(document_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_user, save_translation_at};
    use guampa_common::db::init_memory_database;
    use guampa_common::Timestamp;

    fn new_doc(title: &str, sentences: &[&str], tags: &[&str]) -> NewDocument {
        NewDocument {
            title: title.to_string(),
            owner_id: None,
            source_language: "es".to_string(),
            sentences: sentences.iter().map(|s| s.to_string()).collect(),
            tags: tags.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn at(text: &str) -> Timestamp {
        text.parse().unwrap()
    }

    #[tokio::test]
    async fn test_import_and_list() {
        let pool = init_memory_database().await.unwrap();
        let a = import_document(&pool, &new_doc("A", &["uno"], &["news"])).await.unwrap();
        let b = import_document(&pool, &new_doc("B", &["dos"], &["news", "poetry"]))
            .await
            .unwrap();

        let all = list_documents(&pool).await.unwrap();
        assert_eq!(all.iter().map(|d| d.id).collect::<Vec<_>>(), vec![a, b]);

        let poetry = documents_for_tagname(&pool, "poetry").await.unwrap();
        assert_eq!(poetry.len(), 1);
        assert_eq!(poetry[0].title, "B");

        let news = documents_for_tagname(&pool, "news").await.unwrap();
        assert_eq!(news.len(), 2);

        let tags: Vec<String> = list_tags(&pool)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.text)
            .collect();
        assert_eq!(tags, vec!["news", "poetry"]);
    }

    #[tokio::test]
    async fn test_unknown_tag_is_empty() {
        let pool = init_memory_database().await.unwrap();
        import_document(&pool, &new_doc("A", &["uno"], &["news"])).await.unwrap();

        assert!(documents_for_tagname(&pool, "nonexistent").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_import_rejects_empty_document() {
        let pool = init_memory_database().await.unwrap();
        let err = import_document(&pool, &new_doc("Empty", &[], &[])).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(list_documents(&pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_latest_translation_per_sentence() {
        let pool = init_memory_database().await.unwrap();
        let user = create_user(&pool, "alex", "", "pw").await.unwrap();
        let doc = import_document(&pool, &new_doc("A", &["uno", "dos", "tres"], &[]))
            .await
            .unwrap();
        let rows = document_with_latest_translations(&pool, doc).await.unwrap();
        let s1 = rows[0].sentence.id;
        let s2 = rows[1].sentence.id;

        let draft_time = at("2013-01-01 10:00:00.000000");
        save_translation_at(&pool, user.id, doc, s1, "one (draft)", draft_time)
            .await
            .unwrap();
        save_translation_at(&pool, user.id, doc, s1, "one", at("2013-01-01 11:00:00.000000"))
            .await
            .unwrap();
        save_translation_at(&pool, user.id, doc, s2, "two", at("2013-01-01 09:00:00.000000"))
            .await
            .unwrap();

        let rows = document_with_latest_translations(&pool, doc).await.unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].translation.as_ref().unwrap().text, "one");
        assert_eq!(rows[1].translation.as_ref().unwrap().text, "two");
        assert!(rows[2].translation.is_none());
        assert_eq!(
            rows.iter().map(|r| r.sentence.text.as_str()).collect::<Vec<_>>(),
            vec!["uno", "dos", "tres"]
        );
    }

    #[test]
    fn test_keep_latest_drops_later_rows_of_same_sentence() {
        let sentence = |id| Sentence {
            id,
            document_id: 1,
            ord: id,
            text: format!("s{}", id),
        };
        let translation = |id, sentence_id| Translation {
            id,
            sentence_id,
            user_id: 1,
            text: format!("t{}", id),
            created_at: Timestamp::now(),
        };
        let rows = vec![
            SentenceWithTranslation { sentence: sentence(1), translation: Some(translation(5, 1)) },
            SentenceWithTranslation { sentence: sentence(1), translation: Some(translation(4, 1)) },
            SentenceWithTranslation { sentence: sentence(2), translation: None },
        ];

        let kept = keep_latest(rows);

        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].translation.as_ref().unwrap().id, 5);
        assert!(kept[1].translation.is_none());
    }
}
