use crate::{
    error_message,
    hooks::use_listing,
    is_unauthorized, use_error,
    views::components::{
        Badge, ConfirmModal, Field, FilterSelect, InlineError, SearchInput, TextAreaField,
    },
};
use dioxus::prelude::*;
use types::{
    filter::Choice,
    opportunity::{
        Category, ImageUpload, MAX_IMAGE_BYTES, Opportunity, OpportunityDraft, OpportunityFilter,
        OpportunityStatus,
    },
};

/// A destructive action waiting for confirmation.
#[derive(Debug, Clone, PartialEq)]
enum Pending {
    Delete(Opportunity),
    Cancel(Opportunity),
}

#[component]
pub fn Opportunities() -> Element {
    let opportunities = use_listing(api::list_opportunities);
    let mut search = use_signal(String::new);
    let mut category = use_signal(String::new);
    let mut status = use_signal(String::new);
    let mut editing = use_signal(|| None::<Option<Opportunity>>);
    let mut pending = use_signal(|| None::<Pending>);
    let mut busy = use_signal(|| false);

    let listing = opportunities.listing.read();
    let filter = OpportunityFilter {
        search: search(),
        category: Choice::from(Category::parse(&category())),
        status: Choice::from(OpportunityStatus::parse(&status())),
    };
    let rows = listing.filtered(&filter);

    let run = move |action: Pending| {
        spawn(async move {
            busy.set(true);
            match action {
                Pending::Delete(opportunity) => {
                    match api::delete_opportunity(opportunity.id.clone()).await {
                        Ok(()) => opportunities.settle(|listing| {
                            listing.remove(&opportunity.id);
                        }),
                        Err(e) => opportunities.fail(&e),
                    }
                }
                Pending::Cancel(opportunity) => {
                    match api::cancel_opportunity(opportunity.id.clone()).await {
                        Ok(()) => opportunities.settle(|listing| {
                            listing.patch(&opportunity.id, |o| o.status = OpportunityStatus::Canceled);
                        }),
                        Err(e) => opportunities.fail(&e),
                    }
                }
            }
            busy.set(false);
            pending.set(None);
        });
    };

    rsx! {
        div {
            div { class: "page-header",
                div { class: "page-header-content",
                    h1 { class: "page-title", "Opportunities" }
                    p { class: "page-subtitle", "Volunteering events posted by partner organizations." }
                }
                div { class: "page-header-actions",
                    button {
                        class: "btn btn-primary",
                        onclick: move |_| editing.set(Some(None)),
                        "Create Opportunity"
                    }
                }
            }

            InlineError { message: listing.error().map(String::from) }

            div { class: "filter-bar",
                SearchInput {
                    value: search(),
                    placeholder: "Search by title, description or organization",
                    on_input: move |v| search.set(v),
                }
                FilterSelect {
                    label: "categories",
                    value: category(),
                    options: Category::ALL.iter().map(|c| c.to_string()).collect::<Vec<_>>(),
                    on_change: move |v| category.set(v),
                }
                FilterSelect {
                    label: "statuses",
                    value: status(),
                    options: OpportunityStatus::ALL.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
                    on_change: move |v| status.set(v),
                }
            }

            if listing.is_loading() && listing.is_empty() {
                div { class: "loading", "Loading opportunities..." }
            } else if rows.is_empty() {
                p { class: "empty-state text-muted", "No opportunities match these filters." }
            } else {
                div { class: "card-grid",
                    for opportunity in rows.iter().map(|o| (*o).clone()) {
                        OpportunityCard {
                            key: "{opportunity.id}",
                            opportunity: opportunity.clone(),
                            on_edit: move |o| editing.set(Some(Some(o))),
                            on_cancel: move |o| pending.set(Some(Pending::Cancel(o))),
                            on_delete: move |o| pending.set(Some(Pending::Delete(o))),
                        }
                    }
                }
            }
        }

        if let Some(opportunity) = editing() {
            OpportunityModal {
                opportunity,
                on_close: move |_| editing.set(None),
                on_saved: move |saved: Opportunity| {
                    editing.set(None);
                    opportunities.settle(|listing| listing.upsert(saved));
                },
            }
        }

        if let Some(action) = pending() {
            {
                let (title, subject, confirm_label, busy_label, warning) = match &action {
                    Pending::Delete(o) => (
                        "Delete Opportunity".to_string(),
                        o.title.clone(),
                        "Delete".to_string(),
                        "Deleting...".to_string(),
                        "This action cannot be undone.".to_string(),
                    ),
                    Pending::Cancel(o) => (
                        "Cancel Opportunity".to_string(),
                        o.title.clone(),
                        "Cancel".to_string(),
                        "Canceling...".to_string(),
                        "Volunteers will see it as canceled.".to_string(),
                    ),
                };
                rsx! {
                    ConfirmModal {
                        title,
                        subject,
                        warning,
                        confirm_label,
                        busy_label,
                        busy: busy(),
                        on_close: move |_| pending.set(None),
                        on_confirm: move |_| run(action.clone()),
                    }
                }
            }
        }
    }
}

#[component]
fn OpportunityCard(
    opportunity: Opportunity,
    on_edit: EventHandler<Opportunity>,
    on_cancel: EventHandler<Opportunity>,
    on_delete: EventHandler<Opportunity>,
) -> Element {
    let status_tone = opportunity.status.as_str().to_lowercase();
    let address = opportunity
        .address
        .as_ref()
        .map(|a| a.one_line())
        .filter(|a| !a.is_empty());
    let time = match (opportunity.start_time.as_str(), opportunity.end_time.as_str()) {
        ("", "") => String::new(),
        (start, "") => start.to_string(),
        (start, end) => format!("{start} – {end}"),
    };
    let skills: Vec<String> = opportunity.skill_list().map(String::from).collect();
    let cancellable = opportunity.status.is_cancellable();

    rsx! {
        div { class: "card opportunity-card",
            if let Some(image) = &opportunity.image_url {
                img { class: "opportunity-image", src: "{image}", alt: "{opportunity.title}" }
            }
            div { class: "card-body",
                div { class: "badge-row",
                    Badge { label: opportunity.category.to_string(), tone: "category" }
                    Badge { label: opportunity.status.to_string(), tone: status_tone }
                }
                h3 { class: "opportunity-title", "{opportunity.title}" }
                p { class: "text-muted", "{opportunity.organization}" }
                p { class: "opportunity-description", "{opportunity.description}" }
                dl { class: "opportunity-facts",
                    dt { "Date" }
                    dd { "{opportunity.date_label()}" }
                    if !time.is_empty() {
                        dt { "Time" }
                        dd { "{time}" }
                    }
                    dt { "Location" }
                    dd {
                        "{opportunity.location}"
                        if let Some(address) = address {
                            div { class: "text-muted text-sm", "{address}" }
                        }
                    }
                    dt { "Volunteers" }
                    dd { "{opportunity.confirmed_volunteers} / {opportunity.volunteers} confirmed" }
                    if !opportunity.duration.is_empty() {
                        dt { "Duration" }
                        dd { "{opportunity.duration}" }
                    }
                }
                if !skills.is_empty() {
                    div { class: "chip-row",
                        for skill in skills {
                            span { key: "{skill}", class: "chip", "{skill}" }
                        }
                    }
                }
                if !opportunity.impact.is_empty() {
                    p { class: "opportunity-impact", "{opportunity.impact}" }
                }
            }
            div { class: "card-footer",
                button {
                    class: "btn btn-secondary",
                    onclick: {
                        let opportunity = opportunity.clone();
                        move |_| on_edit.call(opportunity.clone())
                    },
                    "Edit"
                }
                if cancellable {
                    button {
                        class: "btn btn-secondary",
                        onclick: {
                            let opportunity = opportunity.clone();
                            move |_| on_cancel.call(opportunity.clone())
                        },
                        "Cancel"
                    }
                }
                button {
                    class: "btn btn-danger",
                    onclick: {
                        let opportunity = opportunity.clone();
                        move |_| on_delete.call(opportunity.clone())
                    },
                    "Delete"
                }
            }
        }
    }
}

/// Create (`opportunity: None`) or edit an opportunity, optionally with a new image.
#[component]
fn OpportunityModal(
    opportunity: Option<Opportunity>,
    on_close: EventHandler<()>,
    on_saved: EventHandler<Opportunity>,
) -> Element {
    let mut error_state = use_error();
    let id = opportunity.as_ref().map(|o| o.id.clone());
    let existing_image = opportunity.as_ref().and_then(|o| o.image_url.clone());
    let mut draft = use_signal(|| {
        opportunity
            .as_ref()
            .map(OpportunityDraft::from)
            .unwrap_or_default()
    });
    let mut image = use_signal(|| None::<ImageUpload>);
    let mut problem = use_signal(|| None::<String>);
    let mut saving = use_signal(|| false);

    let title = if id.is_some() {
        "Edit Opportunity"
    } else {
        "Create Opportunity"
    };
    let current = draft();
    let preview = image
        .read()
        .as_ref()
        .map(ImageUpload::data_url)
        .or(existing_image);

    let pick_image = move |evt: FormEvent| {
        spawn(async move {
            let Some(file) = evt.files().into_iter().next() else {
                return;
            };
            if file.size() > MAX_IMAGE_BYTES as u64 {
                problem.set(Some("Image size must be less than 5MB".into()));
                return;
            }
            let bytes = match file.read_bytes().await {
                Ok(bytes) => bytes,
                Err(e) => {
                    problem.set(Some(format!("Could not read {}: {e}", file.name())));
                    return;
                }
            };
            let upload = ImageUpload {
                file_name: file.name(),
                content_type: file
                    .content_type()
                    .unwrap_or_else(|| "application/octet-stream".into()),
                bytes: bytes.to_vec(),
            };
            match upload.validate() {
                Ok(()) => {
                    problem.set(None);
                    image.set(Some(upload));
                }
                Err(invalid) => problem.set(Some(invalid.message)),
            }
        });
    };

    let submit = move |_| {
        let draft = draft();
        if let Err(invalid) = draft.validate() {
            problem.set(Some(invalid.message));
            return;
        }
        let id = id.clone();
        let upload = image();
        spawn(async move {
            saving.set(true);
            let result = match id {
                Some(id) => api::update_opportunity(id, draft, upload).await,
                None => api::create_opportunity(draft, upload).await,
            };
            saving.set(false);
            match result {
                Ok(saved) => on_saved.call(saved),
                Err(e) if is_unauthorized(&e) => error_state.set_server_error(&e),
                Err(e) => problem.set(Some(error_message(&e))),
            }
        });
    };

    rsx! {
        div { class: "modal-overlay",
            onclick: move |_| if !saving() { on_close.call(()) },
            div { class: "modal modal-lg",
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
                    div { class: "form-grid",
                        Field {
                            id: "opp-title",
                            label: "Title",
                            value: current.title.clone(),
                            required: true,
                            on_input: move |v| draft.write().title = v,
                        }
                        Field {
                            id: "opp-organization",
                            label: "Organization",
                            value: current.organization.clone(),
                            required: true,
                            on_input: move |v| draft.write().organization = v,
                        }
                        Field {
                            id: "opp-location",
                            label: "Location",
                            value: current.location.clone(),
                            required: true,
                            on_input: move |v| draft.write().location = v,
                        }
                        div { class: "form-group",
                            label { class: "form-label", r#for: "opp-category", "Category *" }
                            select {
                                id: "opp-category",
                                class: "form-input",
                                value: "{current.category}",
                                onchange: move |e| {
                                    if let Some(category) = Category::parse(&e.value()) {
                                        draft.write().category = category;
                                    }
                                },
                                for category in Category::ALL {
                                    option {
                                        key: "{category}",
                                        value: "{category}",
                                        selected: category == current.category,
                                        "{category}"
                                    }
                                }
                            }
                        }
                        Field {
                            id: "opp-date",
                            label: "Date",
                            kind: "date",
                            value: current.date.clone(),
                            required: true,
                            on_input: move |v| draft.write().date = v,
                        }
                        Field {
                            id: "opp-duration",
                            label: "Duration",
                            value: current.duration.clone(),
                            required: true,
                            placeholder: "e.g. 4 hours".to_string(),
                            on_input: move |v| draft.write().duration = v,
                        }
                        Field {
                            id: "opp-start",
                            label: "Start time",
                            kind: "time",
                            value: current.start_time.clone(),
                            required: true,
                            on_input: move |v| draft.write().start_time = v,
                        }
                        Field {
                            id: "opp-end",
                            label: "End time",
                            kind: "time",
                            value: current.end_time.clone(),
                            required: true,
                            on_input: move |v| draft.write().end_time = v,
                        }
                        Field {
                            id: "opp-volunteers",
                            label: "Volunteers needed",
                            kind: "number",
                            value: current.volunteers.to_string(),
                            required: true,
                            min: "1".to_string(),
                            on_input: move |v: String| draft.write().volunteers = v.trim().parse().unwrap_or(0),
                        }
                        Field {
                            id: "opp-skills",
                            label: "Skills",
                            value: current.skills.clone(),
                            required: true,
                            placeholder: "Comma separated, e.g. Teaching, First Aid".to_string(),
                            on_input: move |v| draft.write().skills = v,
                        }
                    }
                    TextAreaField {
                        id: "opp-description",
                        label: "Description",
                        value: current.description.clone(),
                        required: true,
                        on_input: move |v| draft.write().description = v,
                    }
                    TextAreaField {
                        id: "opp-impact",
                        label: "Impact",
                        value: current.impact.clone(),
                        on_input: move |v| draft.write().impact = v,
                    }

                    h3 { class: "section-header", "Address" }
                    div { class: "form-grid",
                        Field {
                            id: "opp-street",
                            label: "Street",
                            value: current.address.street.clone(),
                            on_input: move |v| draft.write().address.street = v,
                        }
                        Field {
                            id: "opp-city",
                            label: "City",
                            value: current.address.city.clone(),
                            on_input: move |v| draft.write().address.city = v,
                        }
                        Field {
                            id: "opp-district",
                            label: "District",
                            value: current.address.district.clone(),
                            on_input: move |v| draft.write().address.district = v,
                        }
                        Field {
                            id: "opp-state",
                            label: "State",
                            value: current.address.state.clone(),
                            on_input: move |v| draft.write().address.state = v,
                        }
                        Field {
                            id: "opp-pincode",
                            label: "Pincode",
                            value: current.address.pincode.clone(),
                            pattern: "[0-9]{6}".to_string(),
                            on_input: move |v| draft.write().address.pincode = v,
                        }
                    }

                    h3 { class: "section-header", "Image" }
                    div { class: "form-group",
                        if let Some(src) = preview {
                            img { class: "image-preview", src: "{src}", alt: "Selected image" }
                        }
                        input {
                            r#type: "file",
                            accept: "image/*",
                            class: "form-input",
                            onchange: pick_image,
                        }
                        p { class: "text-muted text-sm", "PNG or JPEG, up to 5MB." }
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
