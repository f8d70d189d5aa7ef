use crate::{
    hooks::use_listing,
    views::components::{Badge, FilterSelect, InlineError, SearchInput},
};
use dioxus::prelude::*;
use types::{
    application::{Application, ApplicationFilter, ApplicationStatus},
    filter::Choice,
};

#[component]
pub fn Applications() -> Element {
    let applications = use_listing(api::list_applications);
    let mut search = use_signal(String::new);
    let mut status = use_signal(String::new);
    let mut viewing = use_signal(|| None::<Application>);
    let mut updating = use_signal(|| None::<String>);

    let listing = applications.listing.read();
    let filter = ApplicationFilter {
        search: search(),
        status: Choice::from(
            ApplicationStatus::ALL
                .into_iter()
                .find(|s| s.label() == status()),
        ),
    };
    let rows = listing.filtered(&filter);
    let status_options: Vec<String> = ApplicationStatus::ALL
        .iter()
        .map(|s| s.label().to_string())
        .collect();

    let mut decide = move |id: String, decision: ApplicationStatus| {
        // One decision in flight at a time.
        if updating.read().is_some() {
            return;
        }
        updating.set(Some(id.clone()));
        spawn(async move {
            match api::set_application_status(id.clone(), decision).await {
                Ok(()) => applications.settle(|listing| {
                    listing.patch(&id, |a| a.status = decision);
                }),
                Err(e) => applications.fail(&e),
            }
            updating.set(None);
        });
    };

    rsx! {
        div {
            div { class: "page-header",
                div { class: "page-header-content",
                    h1 { class: "page-title", "Applications" }
                    p { class: "page-subtitle", "Review volunteers who applied to opportunities." }
                }
            }

            InlineError { message: listing.error().map(String::from) }

            div { class: "filter-bar",
                SearchInput {
                    value: search(),
                    placeholder: "Search by applicant or opportunity",
                    on_input: move |v| search.set(v),
                }
                FilterSelect {
                    label: "statuses",
                    value: status(),
                    options: status_options,
                    on_change: move |v| status.set(v),
                }
            }

            if listing.is_loading() && listing.is_empty() {
                div { class: "loading", "Loading applications..." }
            } else {
                div { class: "card",
                    div { class: "table-container",
                        table {
                            thead {
                                tr {
                                    th { "Applicant" }
                                    th { "Opportunity" }
                                    th { "Applied" }
                                    th { "Status" }
                                    th { class: "actions-col", "Actions" }
                                }
                            }
                            tbody {
                                for application in rows.iter().map(|a| (*a).clone()) {
                                    {
                                        let id = application.id.clone();
                                        let is_updating = updating.read().as_deref() == Some(id.as_str());
                                        rsx! {
                                            tr { key: "{id}",
                                                td {
                                                    div { class: "name-cell",
                                                        span { class: "avatar", "{application.applicant_initial()}" }
                                                        div {
                                                            div { "{application.applicant.name}" }
                                                            div { class: "text-muted text-sm", "{application.applicant.email}" }
                                                        }
                                                    }
                                                }
                                                td {
                                                    div { "{application.opportunity.title}" }
                                                    div { class: "text-muted text-sm", "{application.opportunity.category}" }
                                                }
                                                td { "{application.applied_label()}" }
                                                td {
                                                    Badge {
                                                        label: application.status.label().to_string(),
                                                        tone: application.status.as_str().to_string(),
                                                    }
                                                }
                                                td { class: "actions-col",
                                                    button {
                                                        class: "btn btn-link",
                                                        onclick: {
                                                            let application = application.clone();
                                                            move |_| viewing.set(Some(application.clone()))
                                                        },
                                                        "View"
                                                    }
                                                    if application.is_pending() {
                                                        button {
                                                            class: "btn btn-success btn-sm",
                                                            disabled: is_updating,
                                                            onclick: {
                                                                let id = id.clone();
                                                                move |_| decide(id.clone(), ApplicationStatus::Accepted)
                                                            },
                                                            "Accept"
                                                        }
                                                        button {
                                                            class: "btn btn-danger btn-sm",
                                                            disabled: is_updating,
                                                            onclick: {
                                                                let id = id.clone();
                                                                move |_| decide(id.clone(), ApplicationStatus::Rejected)
                                                            },
                                                            "Reject"
                                                        }
                                                    }
                                                }
                                            }
                                        }
                                    }
                                }
                                if rows.is_empty() && !listing.is_loading() {
                                    tr {
                                        td { colspan: "5", class: "empty-row", "No applications found" }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }

        if let Some(application) = viewing() {
            ApplicationDetails {
                application,
                on_close: move |_| viewing.set(None),
            }
        }
    }
}

#[component]
fn ApplicationDetails(application: Application, on_close: EventHandler<()>) -> Element {
    let applicant = &application.applicant;
    let opportunity = &application.opportunity;

    rsx! {
        div { class: "modal-overlay",
            onclick: move |_| on_close.call(()),
            div { class: "modal",
                onclick: move |e| e.stop_propagation(),
                div { class: "modal-header",
                    h2 { class: "modal-title", "Application Details" }
                    button {
                        class: "modal-close",
                        onclick: move |_| on_close.call(()),
                        "×"
                    }
                }
                div { class: "modal-body",
                    h3 { class: "section-header", "Applicant" }
                    Detail { label: "Name", value: applicant.name.clone() }
                    Detail { label: "Email", value: applicant.email.clone() }
                    Detail { label: "Phone", value: applicant.phone.clone() }
                    Detail { label: "Experience", value: applicant.experience.clone() }

                    div { class: "divider" }

                    h3 { class: "section-header", "Opportunity" }
                    Detail { label: "Title", value: opportunity.title.clone() }
                    Detail { label: "Category", value: opportunity.category.clone() }
                    Detail { label: "Date", value: opportunity.date.clone() }
                    Detail { label: "Location", value: opportunity.location.clone() }

                    div { class: "divider" }

                    Detail { label: "Applied", value: application.applied_label() }
                    Detail { label: "Status", value: application.status.label().to_string() }
                    Detail { label: "Message", value: application.message.clone() }
                    div { class: "form-group",
                        span { class: "form-label", "Identity proof" }
                        div { class: "form-value",
                            {match &application.id_proof {
                                Some(url) if !url.is_empty() => rsx! {
                                    a { href: "{url}", target: "_blank", rel: "noopener", "Open document" }
                                },
                                _ => rsx! { span { class: "text-muted", "Not provided" } },
                            }}
                        }
                    }
                }
                div { class: "modal-footer",
                    button {
                        class: "btn btn-primary",
                        onclick: move |_| on_close.call(()),
                        "Close"
                    }
                }
            }
        }
    }
}

#[component]
fn Detail(label: &'static str, value: String) -> Element {
    let value = if value.trim().is_empty() {
        "—".to_string()
    } else {
        value
    };

    rsx! {
        div { class: "form-group",
            span { class: "form-label", "{label}" }
            div { class: "form-value", "{value}" }
        }
    }
}
