use serde::{Deserialize, Serialize};

use crate::{
    filter::{Choice, Filter, any_contains},
    listing::Keyed,
    validation::{ValidationError, is_email, require},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "userid", default)]
    pub user_id: Option<String>,
    pub name: String,
    #[serde(rename = "emailid", alias = "email")]
    pub email: String,
    #[serde(alias = "location", default)]
    pub district: String,
    #[serde(default)]
    pub skill: String,
}

impl Keyed for User {
    fn key(&self) -> &str {
        &self.id
    }
}

impl User {
    pub fn initial(&self) -> String {
        self.name
            .chars()
            .next()
            .unwrap_or('?')
            .to_uppercase()
            .to_string()
    }
}

/// Editable user fields. Passwords are write-only and never read back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDraft {
    pub name: String,
    #[serde(rename = "emailid")]
    pub email: String,
    pub district: String,
    pub skill: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub password: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub confirm_password: String,
}

impl From<&User> for UserDraft {
    fn from(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            district: user.district.clone(),
            skill: user.skill.clone(),
            password: String::new(),
            confirm_password: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftMode {
    Create,
    Edit,
}

impl UserDraft {
    pub fn validate(&self, mode: DraftMode) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        require("email", &self.email)?;
        if !is_email(&self.email) {
            return Err(ValidationError::new("email", "Enter a valid email address"));
        }
        require("district", &self.district)?;
        require("skill", &self.skill)?;
        if mode == DraftMode::Create {
            require("password", &self.password)?;
            require("confirm_password", &self.confirm_password)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub search: String,
    pub district: Choice<String>,
}

impl Filter<User> for UserFilter {
    fn matches(&self, user: &User) -> bool {
        let fields = [
            user.user_id.as_deref().unwrap_or_default(),
            user.name.as_str(),
            user.email.as_str(),
        ];
        any_contains(fields, &self.search) && self.district.admits(&user.district)
    }
}

/// Distinct non-empty districts, sorted, for the filter dropdown.
pub fn districts(users: &[User]) -> Vec<String> {
    let mut out: Vec<String> = users
        .iter()
        .map(|u| u.district.trim())
        .filter(|d| !d.is_empty())
        .map(String::from)
        .collect();
    out.sort_unstable();
    out.dedup();
    out
}
