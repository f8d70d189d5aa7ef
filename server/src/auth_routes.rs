use axum::{
    Form, Router,
    extract::State,
    http::{HeaderMap, HeaderValue, header},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use cookie::{Cookie, SameSite};
use secrecy::SecretString;
use serde::Deserialize;
use types::{Result, SESSION_COOKIE_NAME};
use url::form_urlencoded;

use crate::AppState;

pub fn auth_router(state: AppState) -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", get(logout))
        .with_state(state)
}

#[derive(Deserialize)]
struct LoginForm {
    email: String,
    password: SecretString,
}

async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    match login_inner(&state, form).await {
        Ok(token) => {
            let cookie = Cookie::build((SESSION_COOKIE_NAME, token))
                .path("/")
                .http_only(true)
                .secure(state.config.secure_cookies)
                .same_site(SameSite::Lax)
                .build();

            with_cookie(Redirect::to("/").into_response(), &cookie)
        }
        Err(error) => {
            tracing::warn!(%error, "admin login failed");
            let message: String =
                form_urlencoded::byte_serialize(error.to_string().as_bytes()).collect();
            Redirect::to(&format!("/login?error={message}")).into_response()
        }
    }
}

async fn login_inner(state: &AppState, form: LoginForm) -> Result<String> {
    let email = form.email.trim();
    if email.is_empty() {
        return Err(types::err!("Email is required").with_status(400));
    }

    let grant = state.client.login(email, &form.password).await?;
    let expires_at = grant.expires_at();

    state
        .sessions
        .create(grant.admin, grant.token, expires_at)
        .await
}

async fn logout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(token) = crate::session_cookie(&headers)
        && let Err(error) = state.sessions.delete_token(token).await
    {
        tracing::debug!(%error, "logout with unknown session");
    }

    let cookie = Cookie::build((SESSION_COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .max_age(cookie::time::Duration::ZERO)
        .build();

    with_cookie(Redirect::to("/login").into_response(), &cookie)
}

fn with_cookie(mut response: Response, cookie: &Cookie<'_>) -> Response {
    match HeaderValue::from_str(&cookie.to_string()) {
        Ok(value) => {
            response.headers_mut().insert(header::SET_COOKIE, value);
        }
        Err(error) => tracing::error!(%error, "session cookie is not a valid header"),
    }
    response
}
