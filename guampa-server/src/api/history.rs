//! Sentence history feed
//!
//! GET /json/sentencehistory/{id} merges comments and translations of one
//! sentence into a single list, oldest first.

use axum::{
    extract::{Path, State},
    Json,
};
use guampa_common::db::{Comment, Translation};
use guampa_common::Timestamp;
use serde::Serialize;

use super::parse_id;
use crate::db::{self, Authored};
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryKind {
    Comment,
    Translation,
}

#[derive(Debug, Serialize)]
pub struct HistoryItem {
    pub text: String,
    pub ts: String,
    pub username: String,
    #[serde(rename = "type")]
    pub kind: HistoryKind,
}

#[derive(Debug, Serialize)]
pub struct SentenceHistoryResponse {
    pub docid: i64,
    pub text: String,
    pub items: Vec<HistoryItem>,
}

/// GET /json/sentencehistory/{id}
pub async fn sentence_history(
    State(state): State<AppState>,
    Path(sentenceid): Path<String>,
) -> ApiResult<Json<SentenceHistoryResponse>> {
    let sentenceid = parse_id(&sentenceid, "Sentence")?;
    let sentence = db::get_sentence(&state.db, sentenceid)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Sentence not found: {}", sentenceid)))?;

    let comments = db::comments_with_users(&state.db, sentenceid).await?;
    let translations = db::translations_with_users(&state.db, sentenceid).await?;

    Ok(Json(SentenceHistoryResponse {
        docid: sentence.document_id,
        text: sentence.text,
        items: merge_history(comments, translations),
    }))
}

/// Interleave comments and translations by timestamp
///
/// The sort is stable: on equal timestamps comments come before
/// translations, each keeping its input order.
pub fn merge_history(
    comments: Vec<Authored<Comment>>,
    translations: Vec<Authored<Translation>>,
) -> Vec<HistoryItem> {
    let mut entries: Vec<(Timestamp, HistoryItem)> =
        Vec::with_capacity(comments.len() + translations.len());

    for c in comments {
        entries.push((
            c.item.created_at,
            HistoryItem {
                text: c.item.text,
                ts: c.item.created_at.display(),
                username: c.username,
                kind: HistoryKind::Comment,
            },
        ));
    }
    for t in translations {
        entries.push((
            t.item.created_at,
            HistoryItem {
                text: t.item.text,
                ts: t.item.created_at.display(),
                username: t.username,
                kind: HistoryKind::Translation,
            },
        ));
    }

    entries.sort_by_key(|(ts, _)| *ts);
    entries.into_iter().map(|(_, item)| item).collect()
}
