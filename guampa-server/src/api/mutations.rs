//! Translation and comment submission
//!
//! Both endpoints require a session (403 otherwise, checked before the body
//! is looked at). A body that is missing fields or names the wrong sentence
//! is logged and answered with a bare 500.

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde::{de, Deserialize, Deserializer};
use tracing::info;

use crate::session::CurrentUser;
use crate::{db, ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct AddTranslationRequest {
    pub text: String,
    #[serde(deserialize_with = "id_from_number_or_string")]
    pub sentenceid: i64,
    #[serde(deserialize_with = "id_from_number_or_string")]
    pub documentid: i64,
}

#[derive(Debug, Deserialize)]
pub struct AddCommentRequest {
    pub text: String,
    #[serde(deserialize_with = "id_from_number_or_string")]
    pub sentenceid: i64,
}

/// POST /json/add_translation
pub async fn add_translation(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    payload: Result<Json<AddTranslationRequest>, JsonRejection>,
) -> ApiResult<&'static str> {
    let user = current.require()?;
    let Json(request) = payload
        .map_err(|e| ApiError::Internal(format!("Malformed add_translation request: {}", e)))?;
    require_text(&request.text)?;

    let id = db::save_translation(
        &state.db,
        user.id,
        request.documentid,
        request.sentenceid,
        &request.text,
    )
    .await
    .map_err(|e| ApiError::Internal(format!("add_translation failed: {}", e)))?;

    info!(
        "Translation {} of sentence {} saved by {}",
        id, request.sentenceid, user.username
    );
    Ok("OK")
}

/// POST /json/add_comment
pub async fn add_comment(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    payload: Result<Json<AddCommentRequest>, JsonRejection>,
) -> ApiResult<&'static str> {
    let user = current.require()?;
    let Json(request) = payload
        .map_err(|e| ApiError::Internal(format!("Malformed add_comment request: {}", e)))?;
    require_text(&request.text)?;

    let id = db::save_comment(&state.db, user.id, request.sentenceid, &request.text)
        .await
        .map_err(|e| ApiError::Internal(format!("add_comment failed: {}", e)))?;

    info!(
        "Comment {} on sentence {} saved by {}",
        id, request.sentenceid, user.username
    );
    Ok("OK")
}

fn require_text(text: &str) -> ApiResult<()> {
    if text.trim().is_empty() {
        return Err(ApiError::Internal("empty text submitted".to_string()));
    }
    Ok(())
}

/// Browser clients send ids taken from URLs, so accept `7` and `"7"`
fn id_from_number_or_string<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        Text(String),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Number(n) => Ok(n),
        RawId::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid id: {:?}", s))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ids_accept_numbers_and_strings() {
        let a: AddTranslationRequest = serde_json::from_value(json!({
            "text": "x",
            "sentenceid": 3,
            "documentid": "4"
        }))
        .unwrap();
        assert_eq!((a.sentenceid, a.documentid), (3, 4));
    }

    #[test]
    fn test_missing_field_rejected() {
        let result: Result<AddTranslationRequest, _> =
            serde_json::from_value(json!({"text": "x", "sentenceid": 3}));
        assert!(result.is_err());
    }

    #[test]
    fn test_non_numeric_id_rejected() {
        let result: Result<AddCommentRequest, _> =
            serde_json::from_value(json!({"text": "x", "sentenceid": "three"}));
        assert!(result.is_err());
    }
}
