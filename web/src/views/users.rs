use crate::{
    error_message,
    hooks::use_listing,
    is_unauthorized,
    use_error,
    views::components::{ConfirmModal, Field, FilterSelect, InlineError, SearchInput},
};
use dioxus::prelude::*;
use types::{
    filter::Choice,
    user::{DraftMode, User, UserDraft, UserFilter, districts},
};

#[component]
pub fn Users() -> Element {
    let users = use_listing(api::list_users);
    let mut search = use_signal(String::new);
    let mut district = use_signal(String::new);
    let mut editing = use_signal(|| None::<Option<User>>);
    let mut deleting = use_signal(|| None::<User>);
    let mut busy = use_signal(|| false);

    let listing = users.listing.read();
    let filter = UserFilter {
        search: search(),
        district: Choice::from(Some(district()).filter(|d| !d.is_empty())),
    };
    let rows = listing.filtered(&filter);
    let district_options = districts(listing.entries());
    let narrowed = filter != UserFilter::default();

    rsx! {
        div {
            div { class: "page-header",
                div { class: "page-header-content",
                    h1 { class: "page-title", "Users" }
                    p { class: "page-subtitle", "Registered volunteers on the platform." }
                }
                div { class: "page-header-actions",
                    button {
                        class: "btn btn-primary",
                        onclick: move |_| editing.set(Some(None)),
                        "Add User"
                    }
                }
            }

            InlineError { message: listing.error().map(String::from) }

            div { class: "filter-bar",
                SearchInput {
                    value: search(),
                    placeholder: "Search by user id, name or email",
                    on_input: move |v| search.set(v),
                }
                FilterSelect {
                    label: "districts",
                    value: district(),
                    options: district_options,
                    on_change: move |v| district.set(v),
                }
            }

            if narrowed {
                p { class: "result-count text-muted",
                    "Showing {rows.len()} of {listing.len()} users"
                }
            }

            if listing.is_loading() && listing.is_empty() {
                div { class: "loading", "Loading users..." }
            } else {
                div { class: "card",
                    div { class: "table-container",
                        table {
                            thead {
                                tr {
                                    th { "User ID" }
                                    th { "Name" }
                                    th { "Email" }
                                    th { "District" }
                                    th { "Skill" }
                                    th { class: "actions-col", "Actions" }
                                }
                            }
                            tbody {
                                for user in rows.iter().map(|u| (*u).clone()) {
                                    tr { key: "{user.id}",
                                        td { class: "form-value-mono", {user.user_id.clone().unwrap_or_default()} }
                                        td {
                                            div { class: "name-cell",
                                                span { class: "avatar", "{user.initial()}" }
                                                "{user.name}"
                                            }
                                        }
                                        td { "{user.email}" }
                                        td { "{user.district}" }
                                        td { "{user.skill}" }
                                        td { class: "actions-col",
                                            button {
                                                class: "btn btn-link",
                                                onclick: {
                                                    let user = user.clone();
                                                    move |_| editing.set(Some(Some(user.clone())))
                                                },
                                                "Edit"
                                            }
                                            button {
                                                class: "btn btn-link btn-link-danger",
                                                onclick: {
                                                    let user = user.clone();
                                                    move |_| deleting.set(Some(user.clone()))
                                                },
                                                "Delete"
                                            }
                                        }
                                    }
                                }
                                if rows.is_empty() && !listing.is_loading() {
                                    tr {
                                        td { colspan: "6", class: "empty-row", "No users found" }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }

        if let Some(user) = editing() {
            UserModal {
                user,
                on_close: move |_| editing.set(None),
                on_saved: move |_| {
                    editing.set(None);
                    users.settle(|listing| listing.mark_stale());
                },
            }
        }

        if let Some(user) = deleting() {
            ConfirmModal {
                title: "Delete User",
                subject: user.name.clone(),
                confirm_label: "Delete",
                busy_label: "Deleting...",
                busy: busy(),
                on_close: move |_| deleting.set(None),
                on_confirm: {
                    let id = user.id.clone();
                    move |_| {
                        let id = id.clone();
                        spawn(async move {
                            busy.set(true);
                            match api::delete_user(id.clone()).await {
                                Ok(()) => users.settle(|listing| {
                                    listing.remove(&id);
                                }),
                                Err(e) => users.fail(&e),
                            }
                            busy.set(false);
                            deleting.set(None);
                        });
                    }
                },
            }
        }
    }
}

/// Create (`user: None`) or edit a user.
#[component]
fn UserModal(user: Option<User>, on_close: EventHandler<()>, on_saved: EventHandler<()>) -> Element {
    let mut error_state = use_error();
    let mode = if user.is_some() {
        DraftMode::Edit
    } else {
        DraftMode::Create
    };
    let id = user.as_ref().map(|u| u.id.clone());
    let mut draft = use_signal(|| user.as_ref().map(UserDraft::from).unwrap_or_default());
    let mut problem = use_signal(|| None::<String>);
    let mut saving = use_signal(|| false);

    let (title, password_label, password_hint) = match mode {
        DraftMode::Create => ("Add User", "Password", ""),
        DraftMode::Edit => (
            "Edit User",
            "New password",
            "Leave blank to keep the current password",
        ),
    };
    let current = draft();

    let submit = move |_| {
        let draft = draft();
        if let Err(invalid) = draft.validate(mode) {
            problem.set(Some(invalid.message));
            return;
        }
        let id = id.clone();
        spawn(async move {
            saving.set(true);
            let result = match id {
                Some(id) => api::update_user(id, draft).await,
                None => api::register_user(draft).await,
            };
            saving.set(false);
            match result {
                Ok(()) => on_saved.call(()),
                Err(e) if is_unauthorized(&e) => error_state.set_server_error(&e),
                Err(e) => problem.set(Some(error_message(&e))),
            }
        });
    };

    rsx! {
        div { class: "modal-overlay",
            onclick: move |_| if !saving() { on_close.call(()) },
            div { class: "modal",
                onclick: move |e| e.stop_propagation(),
                div { class: "modal-header",
                    h2 { class: "modal-title", "{title}" }
                    button {
                        class: "modal-close",
                        onclick: move |_| on_close.call(()),
                        "×"
                    }
                }
                div { class: "modal-body",
                    InlineError { message: problem() }
                    Field {
                        id: "user-name",
                        label: "Name",
                        value: current.name.clone(),
                        required: true,
                        on_input: move |v| draft.write().name = v,
                    }
                    Field {
                        id: "user-email",
                        label: "Email",
                        kind: "email",
                        value: current.email.clone(),
                        required: true,
                        on_input: move |v| draft.write().email = v,
                    }
                    Field {
                        id: "user-district",
                        label: "District",
                        value: current.district.clone(),
                        required: true,
                        on_input: move |v| draft.write().district = v,
                    }
                    Field {
                        id: "user-skill",
                        label: "Skill",
                        value: current.skill.clone(),
                        required: true,
                        on_input: move |v| draft.write().skill = v,
                    }
                    Field {
                        id: "user-password",
                        label: password_label.to_string(),
                        kind: "password",
                        value: current.password.clone(),
                        required: mode == DraftMode::Create,
                        placeholder: password_hint.to_string(),
                        on_input: move |v| draft.write().password = v,
                    }
                    Field {
                        id: "user-confirm-password",
                        label: "Confirm password",
                        kind: "password",
                        value: current.confirm_password.clone(),
                        required: mode == DraftMode::Create,
                        on_input: move |v| draft.write().confirm_password = v,
                    }
                }
                div { class: "modal-footer",
                    button {
                        class: "btn btn-secondary",
                        disabled: saving(),
                        onclick: move |_| on_close.call(()),
                        "Cancel"
                    }
                    button {
                        class: "btn btn-primary",
                        disabled: saving(),
                        onclick: submit,
                        if saving() { "Saving..." } else { "Save" }
                    }
                }
            }
        }
    }
}
