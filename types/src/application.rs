use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{
    filter::{Choice, Filter, any_contains},
    listing::Keyed,
    opportunity::parse_calendar_date,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 3] = [
        ApplicationStatus::Pending,
        ApplicationStatus::Accepted,
        ApplicationStatus::Rejected,
    ];

    /// The wire value, e.g. `"accepted"`.
    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "Pending",
            ApplicationStatus::Accepted => "Accepted",
            ApplicationStatus::Rejected => "Rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Applicant {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub experience: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppliedOpportunity {
    pub title: String,
    pub category: String,
    pub date: String,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub applicant: Applicant,
    #[serde(default)]
    pub opportunity: AppliedOpportunity,
    #[serde(default)]
    pub applied_date: String,
    #[serde(default)]
    pub status: ApplicationStatus,
    #[serde(default, alias = "notes")]
    pub message: String,
    #[serde(default, alias = "idProofUrl")]
    pub id_proof: Option<String>,
}

impl Keyed for Application {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Application {
    pub fn is_pending(&self) -> bool {
        self.status == ApplicationStatus::Pending
    }

    pub fn applied_on(&self) -> Option<jiff::civil::Date> {
        parse_calendar_date(&self.applied_date)
    }

    pub fn applied_label(&self) -> String {
        match self.applied_on() {
            Some(date) => date.strftime("%b %d, %Y").to_string(),
            None => self.applied_date.clone(),
        }
    }

    pub fn applicant_initial(&self) -> String {
        self.applicant
            .name
            .chars()
            .next()
            .unwrap_or('?')
            .to_uppercase()
            .to_string()
    }
}

/// Body of the status update call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub status: ApplicationStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationFilter {
    pub search: String,
    pub status: Choice<ApplicationStatus>,
}

impl Filter<Application> for ApplicationFilter {
    fn matches(&self, application: &Application) -> bool {
        let fields = [
            application.applicant.name.as_str(),
            application.opportunity.title.as_str(),
        ];
        any_contains(fields, &self.search) && self.status.admits(&application.status)
    }
}
