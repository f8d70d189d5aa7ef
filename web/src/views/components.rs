use dioxus::prelude::*;

/// A labelled single-line input. HTML constraints mirror draft validation.
#[component]
pub fn Field(
    id: String,
    label: String,
    value: String,
    on_input: EventHandler<String>,
    #[props(default = "text")] kind: &'static str,
    #[props(default)] required: bool,
    placeholder: Option<String>,
    pattern: Option<String>,
    min: Option<String>,
) -> Element {
    rsx! {
        div { class: "form-group",
            label { class: "form-label", r#for: "{id}",
                "{label}"
                if required { " *" }
            }
            input {
                id: "{id}",
                class: "form-input",
                r#type: kind,
                required,
                placeholder,
                pattern,
                min,
                value: "{value}",
                oninput: move |e| on_input.call(e.value()),
            }
        }
    }
}

#[component]
pub fn TextAreaField(
    id: String,
    label: String,
    value: String,
    on_input: EventHandler<String>,
    #[props(default)] required: bool,
    placeholder: Option<String>,
) -> Element {
    rsx! {
        div { class: "form-group",
            label { class: "form-label", r#for: "{id}",
                "{label}"
                if required { " *" }
            }
            textarea {
                id: "{id}",
                class: "form-input form-textarea",
                rows: "3",
                required,
                placeholder,
                value: "{value}",
                oninput: move |e| on_input.call(e.value()),
            }
        }
    }
}

/// A dropdown whose first option means "no constraint".
#[component]
pub fn FilterSelect(
    label: String,
    value: String,
    options: Vec<String>,
    on_change: EventHandler<String>,
) -> Element {
    rsx! {
        select {
            class: "form-input filter-select",
            aria_label: "{label}",
            value: "{value}",
            onchange: move |e| on_change.call(e.value()),
            option { value: "", "All {label}" }
            for option_value in options {
                option {
                    key: "{option_value}",
                    value: "{option_value}",
                    selected: option_value == value,
                    "{option_value}"
                }
            }
        }
    }
}

#[component]
pub fn SearchInput(value: String, placeholder: String, on_input: EventHandler<String>) -> Element {
    rsx! {
        input {
            class: "form-input search-input",
            r#type: "search",
            placeholder,
            value: "{value}",
            oninput: move |e| on_input.call(e.value()),
        }
    }
}

#[component]
pub fn Badge(label: String, tone: String) -> Element {
    rsx! {
        span { class: "badge badge-{tone}", "{label}" }
    }
}

/// Asks before a destructive action. Closing is blocked while `busy`.
#[component]
pub fn ConfirmModal(
    title: String,
    subject: String,
    #[props(default = "This action cannot be undone.".to_string())] warning: String,
    confirm_label: String,
    busy_label: String,
    busy: bool,
    on_close: EventHandler<()>,
    on_confirm: EventHandler<()>,
) -> Element {
    rsx! {
        div { class: "modal-overlay",
            onclick: move |_| if !busy { on_close.call(()) },
            div { class: "modal modal-sm",
                onclick: move |e| e.stop_propagation(),
                div { class: "modal-header",
                    h2 { class: "modal-title", "{title}" }
                    if !busy {
                        button {
                            class: "modal-close",
                            onclick: move |_| on_close.call(()),
                            "×"
                        }
                    }
                }
                div { class: "modal-body",
                    p { "Are you sure you want to {confirm_label.to_lowercase()} " strong { "{subject}" } "?" }
                    p { class: "text-muted", "{warning}" }
                }
                div { class: "modal-footer",
                    button {
                        class: "btn btn-secondary",
                        disabled: busy,
                        onclick: move |_| on_close.call(()),
                        "Keep"
                    }
                    button {
                        class: "btn btn-danger",
                        disabled: busy,
                        onclick: move |_| on_confirm.call(()),
                        if busy { "{busy_label}" } else { "{confirm_label}" }
                    }
                }
            }
        }
    }
}

/// Inline failure shown inside a page or modal.
#[component]
pub fn InlineError(#[props(!optional)] message: Option<String>) -> Element {
    rsx! {
        if let Some(message) = message {
            div { class: "alert alert-error", role: "alert", "{message}" }
        }
    }
}
