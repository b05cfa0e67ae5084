//! JSON login, logout and current-user endpoints

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::db::{self, LoginOutcome};
use crate::session::{self, CurrentUser};
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// `{username, fullname}`, both null for anonymous requests
#[derive(Debug, Serialize)]
pub struct CurrentUserResponse {
    pub username: Option<String>,
    pub fullname: Option<String>,
}

/// GET /json/currentuser
pub async fn current_user(
    Extension(current): Extension<CurrentUser>,
) -> Json<CurrentUserResponse> {
    let (username, fullname) = match current.0 {
        Some(user) => (Some(user.username), Some(user.fullname)),
        None => (None, None),
    };
    Json(CurrentUserResponse { username, fullname })
}

/// POST /json/login
///
/// Sets the session cookie on success; 403 and no cookie otherwise.
pub async fn json_login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<(CookieJar, &'static str)> {
    let Json(request) =
        payload.map_err(|e| ApiError::Internal(format!("Malformed login request: {}", e)))?;

    match db::authenticate(&state.db, &request.username, &request.password).await? {
        LoginOutcome::Success(user) => {
            info!("User '{}' logged in", user.username);
            let jar = session::log_in(&state, jar, &user).await;
            Ok((jar, "OK"))
        }
        LoginOutcome::UnknownUser => {
            warn!("Login failed: unknown user '{}'", request.username);
            Err(ApiError::Forbidden("Invalid username".to_string()))
        }
        LoginOutcome::WrongPassword => {
            warn!("Login failed: wrong password for '{}'", request.username);
            Err(ApiError::Forbidden("Invalid password".to_string()))
        }
    }
}

/// GET or POST /json/logout
pub async fn json_logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, &'static str) {
    (session::log_out(&state, jar).await, "OK")
}
