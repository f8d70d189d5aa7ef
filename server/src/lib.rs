mod auth_routes;
mod client;
mod config;
mod dashboard;
pub mod storage;
mod token;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderMap, header};
use dioxus::fullstack::FullstackContext;
use std::sync::{Arc, OnceLock};
use tracing_subscriber::EnvFilter;
use types::{
    AdminSession, Error, Result, SESSION_COOKIE_NAME, err, opportunity::MAX_IMAGE_BYTES,
};

use crate::auth_routes::auth_router;
pub use crate::client::{ApplicationApi, LoginGrant, OpportunityApi, UserApi, VolunteerClient};
pub use crate::config::Config;
pub use crate::dashboard::dashboard;
use crate::storage::SessionStore;

/// Everything the server needs to act on behalf of a logged-in admin.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub client: VolunteerClient,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let client = VolunteerClient::new(config.api_url.clone(), config.request_timeout())?;
        let sessions = SessionStore::new(config.signing_secret.clone(), config.session_ttl());

        Ok(Self {
            config: Arc::new(config),
            client,
            sessions,
        })
    }
}

static STATE: OnceLock<AppState> = OnceLock::new();

/// Largest server function body: a maximum-size image as base64 plus the form.
pub const MAX_REQUEST_BYTES: usize = MAX_IMAGE_BYTES.div_ceil(3) * 4 + 1024 * 1024;

/// Raise axum's default body limit so opportunity images up to the cap fit.
pub fn limit_request_bodies(router: Router) -> Router {
    router.layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES))
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Another subscriber may already be installed by the dioxus runtime.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Load configuration and build the auth routes.
pub async fn init() -> Result<Router> {
    let config = Config::load()?;
    tracing::info!(api_url = %config.api_url, "using volunteer API");

    let state = AppState::new(config)?;
    let state = STATE.get_or_init(|| state).clone();
    Ok(auth_router(state))
}

pub fn state() -> Result<&'static AppState> {
    STATE
        .get()
        .ok_or_else(|| err!("server state not initialized"))
}

pub fn volunteer_api() -> Result<&'static VolunteerClient> {
    Ok(&state()?.client)
}

/// The session token from a request's cookie header, if any.
pub(crate) fn session_cookie(headers: &HeaderMap) -> Option<&str> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;

    cookie_header
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix(SESSION_COOKIE_NAME)?.strip_prefix('='))
}

/// Require a live admin session for the current server function call.
pub async fn require_session() -> Result<AdminSession> {
    let headers: HeaderMap = FullstackContext::extract().await?;
    let token = session_cookie(&headers).ok_or_else(|| Error::unauthorized("not signed in"))?;

    state()?.sessions.find_token(token).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn session_cookie_is_found_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("theme=dark; {SESSION_COOKIE_NAME}=abc.def; x=1"))
                .unwrap(),
        );
        assert_eq!(session_cookie(&headers), Some("abc.def"));
    }

    #[test]
    fn similarly_named_cookie_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("{SESSION_COOKIE_NAME}_old=zzz")).unwrap(),
        );
        assert_eq!(session_cookie(&headers), None);
    }
}
