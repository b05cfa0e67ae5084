//! Server-rendered pages and response helpers
//!
//! The form-based /login and /logout pages serve browsers without
//! JavaScript; everything else in the browser client is static files.

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode, Uri},
    response::{Html, Redirect},
    routing::get,
    Form, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Deserialize;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{info, warn};

use crate::db::{self, LoginOutcome};
use crate::session;
use crate::{ApiResult, AppState};

const LOGIN_HTML: &str = include_str!("../ui/login.html");

/// One-shot message carried across the logout redirect
const FLASH_COOKIE: &str = "guampa_flash";
const FLASH_LOGGED_OUT: &str = "logged_out";

/// Build /login and /logout routes
pub fn login_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_page).post(login_submit))
        .route("/logout", get(logout))
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// GET /login
pub async fn login_page(jar: CookieJar) -> (CookieJar, Html<String>) {
    let flash = jar
        .get(FLASH_COOKIE)
        .and_then(|c| flash_text(c.value()));

    let jar = if jar.get(FLASH_COOKIE).is_some() {
        jar.remove(Cookie::build(FLASH_COOKIE).path("/"))
    } else {
        jar
    };

    (jar, render_login(flash, None, ""))
}

/// POST /login
pub async fn login_submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> ApiResult<(CookieJar, Html<String>)> {
    match db::authenticate(&state.db, &form.username, &form.password).await? {
        LoginOutcome::Success(user) => {
            info!("User '{}' logged in via form", user.username);
            let jar = session::log_in(&state, jar, &user).await;
            Ok((jar, render_login(Some("You were logged in"), None, &user.username)))
        }
        LoginOutcome::UnknownUser => {
            warn!("Form login failed: unknown user '{}'", form.username);
            Ok((jar, render_login(None, Some("Invalid username"), &form.username)))
        }
        LoginOutcome::WrongPassword => {
            warn!("Form login failed: wrong password for '{}'", form.username);
            Ok((jar, render_login(None, Some("Invalid password"), &form.username)))
        }
    }
}

/// GET /logout
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    let jar = session::log_out(&state, jar).await;
    let flash = Cookie::build((FLASH_COOKIE, FLASH_LOGGED_OUT))
        .path("/")
        .http_only(true)
        .build();
    (jar.add(flash), Redirect::to("/login"))
}

fn flash_text(code: &str) -> Option<&'static str> {
    match code {
        FLASH_LOGGED_OUT => Some("You were logged out"),
        _ => None,
    }
}

fn render_login(flash: Option<&str>, error: Option<&str>, username: &str) -> Html<String> {
    let mut messages = String::new();
    if let Some(flash) = flash {
        messages.push_str(&format!("<p class=\"flash\">{}</p>", escape_html(flash)));
    }
    if let Some(error) = error {
        messages.push_str(&format!(
            "<p class=\"error\"><strong>Error:</strong> {}</p>",
            escape_html(error)
        ));
    }

    Html(
        LOGIN_HTML
            .replace("{{MESSAGES}}", &messages)
            .replace("{{USERNAME}}", &escape_html(username)),
    )
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Mark every response from `router` as uncacheable
pub fn no_cache<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store, no-cache, must-revalidate, max-age=0"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::PRAGMA,
            HeaderValue::from_static("no-cache"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::EXPIRES,
            HeaderValue::from_static("0"),
        ))
}

/// Fallback for unknown routes
pub async fn not_found(uri: Uri) -> (StatusCode, String) {
    (
        StatusCode::NOT_FOUND,
        format!("Nothing here, sorry: {}", uri.path()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<b>\"Tom\" & 'Jerry'</b>"),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_render_login_with_error_keeps_username() {
        let Html(page) = render_login(None, Some("Invalid username"), "<alex>");
        assert!(page.contains("Invalid username"));
        assert!(page.contains("value=\"&lt;alex&gt;\""));
        assert!(!page.contains("{{"));
    }

    #[test]
    fn test_render_login_plain() {
        let Html(page) = render_login(None, None, "");
        assert!(!page.contains("class=\"error\""));
        assert!(!page.contains("class=\"flash\""));
        assert!(page.contains("<form action=\"/login\" method=\"post\">"));
    }

    #[test]
    fn test_unknown_flash_code_ignored() {
        assert_eq!(flash_text(FLASH_LOGGED_OUT), Some("You were logged out"));
        assert_eq!(flash_text("bogus"), None);
    }
}
