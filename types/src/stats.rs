//! Aggregates shown on the dashboard.

use jiff::{ToSpan, civil::Date};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::{
    application::{Application, ApplicationStatus},
    opportunity::{Category, Opportunity, OpportunityStatus},
    user::User,
};

const SERIES_MONTHS: i32 = 6;
const RECENT_ACTIVITY: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_users: usize,
    pub total_opportunities: usize,
    pub active_volunteers: usize,
    pub pending_applications: usize,
    pub volunteer_hours: f64,
    pub monthly_applications: Vec<MonthlyCount>,
    pub category_breakdown: Vec<CategoryBreakdown>,
    pub recent_activity: Vec<Activity>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyCount {
    /// Short label such as "Mar 2024".
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub category: Category,
    pub open: usize,
    pub filled: usize,
    pub completed: usize,
    pub canceled: usize,
}

impl CategoryBreakdown {
    pub fn total(&self) -> usize {
        self.open + self.filled + self.completed + self.canceled
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub applicant: String,
    pub opportunity: String,
    pub status: ApplicationStatus,
    pub date: String,
}

impl DashboardStats {
    pub fn compute(
        users: &[User],
        opportunities: &[Opportunity],
        applications: &[Application],
        today: Date,
    ) -> Self {
        Self {
            total_users: users.len(),
            total_opportunities: opportunities.len(),
            active_volunteers: active_volunteers(applications),
            pending_applications: applications.iter().filter(|a| a.is_pending()).count(),
            volunteer_hours: volunteer_hours(opportunities),
            monthly_applications: monthly_applications(applications, today),
            category_breakdown: category_breakdown(opportunities),
            recent_activity: recent_activity(applications),
        }
    }

    /// Largest monthly count, for scaling the chart.
    pub fn peak_month(&self) -> usize {
        self.monthly_applications
            .iter()
            .map(|m| m.count)
            .max()
            .unwrap_or(0)
    }
}

fn active_volunteers(applications: &[Application]) -> usize {
    applications
        .iter()
        .filter(|a| a.status == ApplicationStatus::Accepted)
        .map(|a| a.applicant.email.trim().to_lowercase())
        .filter(|email| !email.is_empty())
        .collect::<HashSet<_>>()
        .len()
}

fn volunteer_hours(opportunities: &[Opportunity]) -> f64 {
    opportunities
        .iter()
        .filter(|o| o.status == OpportunityStatus::Completed)
        .filter_map(|o| Some(o.duration_hours()? * f64::from(o.confirmed_volunteers)))
        .sum()
}

fn monthly_applications(applications: &[Application], today: Date) -> Vec<MonthlyCount> {
    let this_month = today.first_of_month();
    let months: Vec<Date> = (0..SERIES_MONTHS)
        .rev()
        .filter_map(|back| this_month.checked_sub(back.months()).ok())
        .collect();

    let mut counts: BTreeMap<Date, usize> = months.iter().map(|m| (*m, 0)).collect();
    for date in applications.iter().filter_map(Application::applied_on) {
        if let Some(count) = counts.get_mut(&date.first_of_month()) {
            *count += 1;
        }
    }

    counts
        .into_iter()
        .map(|(month, count)| MonthlyCount {
            label: month.strftime("%b %Y").to_string(),
            count,
        })
        .collect()
}

fn category_breakdown(opportunities: &[Opportunity]) -> Vec<CategoryBreakdown> {
    Category::ALL
        .into_iter()
        .map(|category| {
            let mut row = CategoryBreakdown {
                category,
                ..Default::default()
            };
            for opp in opportunities.iter().filter(|o| o.category == category) {
                match opp.status {
                    OpportunityStatus::Open => row.open += 1,
                    OpportunityStatus::Filled => row.filled += 1,
                    OpportunityStatus::Completed => row.completed += 1,
                    OpportunityStatus::Canceled => row.canceled += 1,
                }
            }
            row
        })
        .collect()
}

fn recent_activity(applications: &[Application]) -> Vec<Activity> {
    let mut dated: Vec<&Application> = applications.iter().collect();
    // ISO dates sort chronologically as text
    dated.sort_by(|a, b| b.applied_date.cmp(&a.applied_date));
    dated
        .into_iter()
        .take(RECENT_ACTIVITY)
        .map(|a| Activity {
            applicant: a.applicant.name.clone(),
            opportunity: a.opportunity.title.clone(),
            status: a.status,
            date: a.applied_label(),
        })
        .collect()
}
