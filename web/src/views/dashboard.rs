use crate::{Route, use_error, use_session};
use dioxus::prelude::*;
use types::{
    application::ApplicationStatus,
    stats::{CategoryBreakdown, DashboardStats, MonthlyCount},
};

const CHART_WIDTH: f64 = 480.0;
const CHART_HEIGHT: f64 = 180.0;
const BAR_GAP: f64 = 16.0;

#[component]
pub fn Dashboard() -> Element {
    let session = use_session();
    let mut error_state = use_error();
    let stats = use_resource(api::dashboard);

    use_effect(move || {
        if let Some(Err(e)) = &*stats.read() {
            error_state.set_server_error(e);
        }
    });

    let greeting = session
        .identity()
        .map(|identity| format!("Welcome back, {}.", identity.display_name()))
        .unwrap_or_default();

    rsx! {
        div {
            div { class: "page-header",
                div { class: "page-header-content",
                    h1 { class: "page-title", "Dashboard" }
                    p { class: "page-subtitle", "{greeting} Here is how the platform is doing." }
                }
            }
            {match &*stats.read() {
                None => rsx! { div { class: "loading", "Loading statistics..." } },
                Some(Err(_)) => rsx! { p { class: "text-muted", "Statistics are unavailable right now." } },
                Some(Ok(stats)) => rsx! { DashboardBody { stats: stats.clone() } },
            }}
        }
    }
}

#[component]
fn DashboardBody(stats: DashboardStats) -> Element {
    let hours = format_hours(stats.volunteer_hours);

    rsx! {
        div { class: "stat-grid",
            StatCard { label: "Registered users", value: stats.total_users.to_string(), to: Route::Users {} }
            StatCard { label: "Opportunities", value: stats.total_opportunities.to_string(), to: Route::Opportunities {} }
            StatCard { label: "Active volunteers", value: stats.active_volunteers.to_string(), to: Route::Applications {} }
            StatCard { label: "Pending applications", value: stats.pending_applications.to_string(), to: Route::Applications {} }
            StatCard { label: "Volunteer hours", value: hours, to: Route::Opportunities {} }
        }
        div { class: "grid grid-cols-2",
            div { class: "card",
                div { class: "card-header",
                    h2 { class: "card-title", "Applications per month" }
                }
                div { class: "card-body",
                    MonthlyChart { months: stats.monthly_applications.clone(), peak: stats.peak_month() }
                }
            }
            div { class: "card",
                div { class: "card-header",
                    h2 { class: "card-title", "Opportunities by category" }
                }
                div { class: "card-body",
                    CategoryBars { rows: stats.category_breakdown.clone() }
                }
            }
        }
        div { class: "card",
            div { class: "card-header",
                h2 { class: "card-title", "Recent activity" }
            }
            div { class: "card-body",
                if stats.recent_activity.is_empty() {
                    p { class: "text-muted", "No applications yet." }
                }
                ul { class: "activity-feed",
                    for (i, activity) in stats.recent_activity.iter().enumerate() {
                        li { key: "{i}", class: "activity-item",
                            span { class: "activity-dot activity-{activity.status.as_str()}" }
                            div { class: "activity-text",
                                strong { "{activity.applicant}" }
                                " {activity_verb(activity.status)} "
                                strong { "{activity.opportunity}" }
                            }
                            span { class: "activity-date text-muted", "{activity.date}" }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn StatCard(label: &'static str, value: String, to: Route) -> Element {
    rsx! {
        Link { to, class: "stat-card",
            div { class: "stat-value", "{value}" }
            div { class: "stat-label", "{label}" }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Bar {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    center: f64,
    label: String,
    count: usize,
}

fn bars(months: &[MonthlyCount], peak: usize) -> Vec<Bar> {
    if months.is_empty() {
        return Vec::new();
    }
    let slot = CHART_WIDTH / months.len() as f64;
    let width = (slot - BAR_GAP).max(1.0);

    months
        .iter()
        .enumerate()
        .map(|(i, month)| {
            let height = if peak == 0 {
                0.0
            } else {
                CHART_HEIGHT * month.count as f64 / peak as f64
            };
            let x = i as f64 * slot + BAR_GAP / 2.0;
            Bar {
                x,
                y: CHART_HEIGHT - height,
                width,
                height,
                center: x + width / 2.0,
                label: month.label.clone(),
                count: month.count,
            }
        })
        .collect()
}

#[component]
fn MonthlyChart(months: Vec<MonthlyCount>, peak: usize) -> Element {
    let bars = bars(&months, peak);
    let label_y = CHART_HEIGHT + 18.0;
    let view_box = format!("0 0 {CHART_WIDTH} {}", CHART_HEIGHT + 24.0);

    rsx! {
        svg {
            class: "bar-chart",
            view_box,
            role: "img",
            for bar in bars {
                g { key: "{bar.label}",
                    rect {
                        class: "bar",
                        x: "{bar.x}",
                        y: "{bar.y}",
                        width: "{bar.width}",
                        height: "{bar.height}",
                        rx: "3",
                        title { "{bar.label}: {bar.count}" }
                    }
                    text {
                        class: "bar-label",
                        x: "{bar.center}",
                        y: "{label_y}",
                        text_anchor: "middle",
                        "{bar.label}"
                    }
                }
            }
        }
    }
}

/// Percentage widths of each status segment in a category row.
fn segments(row: &CategoryBreakdown) -> [(&'static str, f64); 4] {
    let total = row.total();
    let share = |n: usize| {
        if total == 0 {
            0.0
        } else {
            100.0 * n as f64 / total as f64
        }
    };
    [
        ("open", share(row.open)),
        ("filled", share(row.filled)),
        ("completed", share(row.completed)),
        ("canceled", share(row.canceled)),
    ]
}

#[component]
fn CategoryBars(rows: Vec<CategoryBreakdown>) -> Element {
    rsx! {
        ul { class: "stacked-list",
            for row in rows {
                li { key: "{row.category}", class: "stacked-row",
                    div { class: "stacked-label",
                        span { "{row.category}" }
                        span { class: "text-muted", "{row.total()}" }
                    }
                    div { class: "stacked-bar",
                        for (status, width) in segments(&row) {
                            if width > 0.0 {
                                span {
                                    key: "{status}",
                                    class: "segment segment-{status}",
                                    style: format!("width: {width:.1}%"),
                                    title: "{status}",
                                }
                            }
                        }
                    }
                }
            }
        }
        div { class: "legend",
            for status in ["open", "filled", "completed", "canceled"] {
                span { key: "{status}", class: "legend-item",
                    span { class: "segment segment-{status}" }
                    "{status}"
                }
            }
        }
    }
}

fn activity_verb(status: ApplicationStatus) -> &'static str {
    match status {
        ApplicationStatus::Pending => "applied to",
        ApplicationStatus::Accepted => "was accepted for",
        ApplicationStatus::Rejected => "was declined for",
    }
}

fn format_hours(hours: f64) -> String {
    if hours.fract() == 0.0 {
        format!("{hours:.0}")
    } else {
        format!("{hours:.1}")
    }
}
