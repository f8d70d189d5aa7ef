use dioxus::prelude::*;

mod hooks;
mod views;

use types::{AdminIdentity, SessionInfo};
use views::{Applications, Dashboard, Login, Opportunities, Users};

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[route("/login?:error")]
    Login { error: Option<String> },
    #[layout(AuthenticatedLayout)]
        #[route("/")]
        Dashboard {},
        #[route("/users")]
        Users {},
        #[route("/opportunities")]
        Opportunities {},
        #[route("/applications")]
        Applications {},
}

fn main() {
    #[cfg(feature = "server")]
    {
        server::init_tracing();
        dioxus::serve(|| async move {
            let routes = server::init().await?;

            let router = dioxus::server::router(App).merge(routes);

            Ok(server::limit_request_bodies(router))
        });
    }

    #[cfg(all(feature = "web", not(feature = "server")))]
    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    use_context_provider(|| ErrorState(Signal::new(None)));

    rsx! {
        document::Title { "Volunteer Admin" }
        document::Link { rel: "icon", href: asset!("/assets/favicon.svg") }
        document::Link { rel: "stylesheet", href: asset!("/assets/main.css") }

        Router::<Route> {}
    }
}

#[component]
fn NavLink(to: Route, children: Element) -> Element {
    let current_route: Route = use_route();
    let is_active = current_route == to;

    rsx! {
        Link {
            to,
            class: if is_active { "active" },
            {children}
        }
    }
}

/// Who is signed in, as seen by the browser.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionContext {
    info: Option<SessionInfo>,
}

impl SessionContext {
    pub const LOGOUT_URL: &'static str = "/auth/logout";

    pub fn new(info: Option<SessionInfo>) -> Self {
        Self { info }
    }

    pub fn is_authenticated(&self) -> bool {
        self.info.is_some()
    }

    pub fn identity(&self) -> Option<&AdminIdentity> {
        self.info.as_ref().map(|info| &info.identity)
    }

    pub fn expires_label(&self) -> Option<String> {
        let info = self.info.as_ref()?;
        Some(info.expires_at.strftime("%b %d, %H:%M UTC").to_string())
    }
}

pub fn use_session() -> SessionContext {
    use_context::<SessionContext>()
}

/// Structured error information for display
#[derive(Clone, Debug, Default)]
pub struct ErrorInfo {
    pub message: String,
    pub chain: Vec<String>,
    pub backtrace: Option<String>,
}

impl ErrorInfo {
    /// Parse a ServerFnError to extract structured error info
    pub fn from_server_error(err: &ServerFnError) -> Self {
        let message = error_message(err);
        let details = match err {
            ServerFnError::ServerError { details, .. } => details.as_ref(),
            _ => None,
        };

        let chain = details
            .and_then(|d| d.get("chain"))
            .and_then(|c| c.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_else(|| vec![message.clone()]);
        let backtrace = details
            .and_then(|d| d.get("backtrace"))
            .and_then(|b| b.as_str())
            .map(String::from);

        Self {
            message,
            chain,
            backtrace,
        }
    }
}

/// The message worth showing a person for a failed server call.
pub fn error_message(err: &ServerFnError) -> String {
    match err {
        ServerFnError::ServerError { message, .. } => message.clone(),
        other => other.to_string(),
    }
}

pub fn is_unauthorized(err: &ServerFnError) -> bool {
    matches!(err, ServerFnError::ServerError { code: 401, .. })
}

/// Global error state - use `use_error()` to access
#[derive(Clone, Copy)]
pub struct ErrorState(Signal<Option<ErrorInfo>>);

impl ErrorState {
    pub fn set_server_error(&mut self, err: &ServerFnError) {
        // An expired session sends the admin back to the login page.
        if is_unauthorized(err) {
            navigator().push(Route::Login {
                error: Some(error_message(err)),
            });
            return;
        }
        self.0.set(Some(ErrorInfo::from_server_error(err)));
    }

    pub fn clear(&mut self) {
        self.0.set(None);
    }
}

/// Get the global error state for setting/clearing errors
pub fn use_error() -> ErrorState {
    use_context::<ErrorState>()
}

/// Filter backtrace to only show lines from this workspace
fn filter_backtrace(backtrace: &str) -> String {
    const OWN_CRATES: [&str; 4] = ["types::", "server::", "api::", "web::"];

    backtrace
        .lines()
        .filter(|line| OWN_CRATES.iter().any(|krate| line.contains(krate)))
        .collect::<Vec<_>>()
        .join("\n")
}

#[component]
fn ErrorBanner() -> Element {
    let mut error_state = use_context::<ErrorState>();
    let error = error_state.0.read();

    let Some(err) = error.as_ref() else {
        return rsx! {};
    };

    let has_chain = err.chain.len() > 1;
    let filtered_backtrace = err
        .backtrace
        .as_deref()
        .map(filter_backtrace)
        .filter(|bt| !bt.is_empty());

    rsx! {
        div { class: "error-banner",
            div { class: "error-banner-content",
                div { class: "error-banner-header",
                    span { class: "error-banner-message", "{err.message}" }
                    button {
                        class: "error-banner-close",
                        onclick: move |_| error_state.clear(),
                        "×"
                    }
                }
                if has_chain || filtered_backtrace.is_some() {
                    div { class: "error-details",
                        if has_chain {
                            div { class: "error-chain",
                                h4 { class: "error-section-title", "Error Chain" }
                                ol { class: "error-chain-list",
                                    for (i, msg) in err.chain.iter().enumerate() {
                                        li { key: "{i}", class: "error-chain-item", "{msg}" }
                                    }
                                }
                            }
                        }
                        if let Some(backtrace) = &filtered_backtrace {
                            div { class: "error-backtrace",
                                h4 { class: "error-section-title", "Backtrace" }
                                pre { class: "error-backtrace-content", "{backtrace}" }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn AuthenticatedLayout() -> Element {
    let session = use_server_future(api::current_session)?;
    let context = use_context_provider(|| {
        SessionContext::new(match &*session.read() {
            Some(Ok(info)) => info.clone(),
            _ => None,
        })
    });

    if !context.is_authenticated() {
        navigator().push(Route::Login { error: None });
        return rsx! {
            div { class: "loading", "Redirecting to login..." }
        };
    }

    let name = context
        .identity()
        .map(|identity| identity.display_name().to_string())
        .unwrap_or_default();
    let initial = context
        .identity()
        .map(AdminIdentity::initial)
        .unwrap_or_default();
    let expires = context.expires_label().unwrap_or_default();

    rsx! {
        div { class: "app-layout",
            aside { class: "sidebar",
                div { class: "sidebar-header",
                    span { class: "sidebar-logo", "Volunteer Admin" }
                }
                nav { class: "sidebar-nav",
                    NavLink { to: Route::Dashboard {}, "Dashboard" }
                    NavLink { to: Route::Users {}, "Users" }
                    NavLink { to: Route::Opportunities {}, "Opportunities" }
                    NavLink { to: Route::Applications {}, "Applications" }
                }
                div { class: "sidebar-footer",
                    div { class: "sidebar-user",
                        div { class: "sidebar-avatar", "{initial}" }
                        div { class: "sidebar-user-info",
                            div { class: "sidebar-user-name", "{name}" }
                            div { class: "sidebar-user-role", "Signed in until {expires}" }
                        }
                    }
                    a {
                        href: SessionContext::LOGOUT_URL,
                        rel: "external",
                        class: "sidebar-logout",
                        "Sign out"
                    }
                }
            }
            main { class: "main-content",
                ErrorBanner {}
                Outlet::<Route> {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::Timestamp;

    fn info() -> SessionInfo {
        SessionInfo {
            identity: AdminIdentity {
                id: "admin-1".into(),
                name: "Meera".into(),
                email: "meera@example.org".into(),
            },
            expires_at: "2024-05-01T18:30:00Z".parse::<Timestamp>().unwrap(),
        }
    }

    #[test]
    fn empty_context_is_signed_out() {
        let context = SessionContext::new(None);
        assert!(!context.is_authenticated());
        assert!(context.identity().is_none());
    }

    #[test]
    fn context_exposes_identity_and_expiry() {
        let context = SessionContext::new(Some(info()));
        assert!(context.is_authenticated());
        assert_eq!(context.identity().unwrap().name, "Meera");
        assert_eq!(context.expires_label().unwrap(), "May 01, 18:30 UTC");
    }

    #[test]
    fn backtrace_keeps_workspace_frames() {
        let backtrace = "0: std::rt::lang_start\n1: server::client::send_checked\n2: tokio::runtime";
        assert_eq!(filter_backtrace(backtrace), "1: server::client::send_checked");
    }

    #[test]
    fn unauthorized_server_errors_are_detected() {
        let err = ServerFnError::ServerError {
            message: "session expired".into(),
            code: 401,
            details: None,
        };
        assert!(is_unauthorized(&err));
        assert_eq!(error_message(&err), "session expired");

        let info = ErrorInfo::from_server_error(&err);
        assert_eq!(info.chain, vec!["session expired".to_string()]);
    }
}
