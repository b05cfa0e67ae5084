//! Document listing, tag listing and document detail
//!
//! GET /json/documents, /json/documents/{tag}, /json/tags, /json/document/{id}

use axum::{
    extract::{Path, State},
    Json,
};
use guampa_common::db::Document;
use serde::Serialize;
use tracing::debug;

use super::parse_id;
use crate::{db, ApiError, ApiResult, AppState};

#[derive(Debug, Serialize)]
pub struct DocumentSummary {
    pub title: String,
    pub id: i64,
}

impl From<Document> for DocumentSummary {
    fn from(doc: Document) -> Self {
        Self {
            title: doc.title,
            id: doc.id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DocumentListResponse {
    pub documents: Vec<DocumentSummary>,
}

impl From<Vec<Document>> for DocumentListResponse {
    fn from(docs: Vec<Document>) -> Self {
        Self {
            documents: docs.into_iter().map(DocumentSummary::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TagListResponse {
    pub tags: Vec<String>,
}

/// One entry per sentence; `text` is null until someone translates it
#[derive(Debug, Serialize)]
pub struct TranslationSlot {
    pub text: Option<String>,
    pub sentenceid: i64,
    pub docid: i64,
}

/// Everything the editor needs to render a document
#[derive(Debug, Serialize)]
pub struct DocumentDetailResponse {
    pub docid: i64,
    pub sentences: Vec<String>,
    pub translations: Vec<TranslationSlot>,
}

/// GET /json/documents
pub async fn list_documents(
    State(state): State<AppState>,
) -> ApiResult<Json<DocumentListResponse>> {
    let docs = db::list_documents(&state.db).await?;
    Ok(Json(docs.into()))
}

/// GET /json/documents/{tag}
///
/// The tag may contain `/`; an unknown tag yields an empty list.
pub async fn documents_for_tag(
    State(state): State<AppState>,
    Path(tagname): Path<String>,
) -> ApiResult<Json<DocumentListResponse>> {
    let docs = db::documents_for_tagname(&state.db, &tagname).await?;
    debug!("{} documents tagged '{}'", docs.len(), tagname);
    Ok(Json(docs.into()))
}

/// GET /json/tags
pub async fn list_tags(State(state): State<AppState>) -> ApiResult<Json<TagListResponse>> {
    let tags = db::list_tags(&state.db).await?;
    Ok(Json(TagListResponse {
        tags: tags.into_iter().map(|t| t.text).collect(),
    }))
}

/// GET /json/document/{id}
pub async fn document_detail(
    State(state): State<AppState>,
    Path(docid): Path<String>,
) -> ApiResult<Json<DocumentDetailResponse>> {
    let docid = parse_id(&docid, "Document")?;
    if db::get_document(&state.db, docid).await?.is_none() {
        return Err(ApiError::NotFound(format!("Document not found: {}", docid)));
    }

    let rows = db::document_with_latest_translations(&state.db, docid).await?;

    let mut sentences = Vec::with_capacity(rows.len());
    let mut translations = Vec::with_capacity(rows.len());
    for row in rows {
        translations.push(TranslationSlot {
            text: row.translation.map(|t| t.text),
            sentenceid: row.sentence.id,
            docid,
        });
        sentences.push(row.sentence.text);
    }

    Ok(Json(DocumentDetailResponse {
        docid,
        sentences,
        translations,
    }))
}
