use base64::{Engine, prelude::BASE64_STANDARD};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::{
    filter::{Choice, Filter, any_contains},
    listing::Keyed,
    validation::{ValidationError, require},
};

pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[default]
    Environment,
    Education,
    Healthcare,
    Community,
    #[serde(rename = "Animal Welfare")]
    AnimalWelfare,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Environment,
        Category::Education,
        Category::Healthcare,
        Category::Community,
        Category::AnimalWelfare,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Environment => "Environment",
            Category::Education => "Education",
            Category::Healthcare => "Healthcare",
            Category::Community => "Community",
            Category::AnimalWelfare => "Animal Welfare",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == value)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OpportunityStatus {
    #[default]
    Open,
    Filled,
    Completed,
    #[serde(alias = "Cancelled")]
    Canceled,
}

impl OpportunityStatus {
    pub const ALL: [OpportunityStatus; 4] = [
        OpportunityStatus::Open,
        OpportunityStatus::Filled,
        OpportunityStatus::Completed,
        OpportunityStatus::Canceled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OpportunityStatus::Open => "Open",
            OpportunityStatus::Filled => "Filled",
            OpportunityStatus::Completed => "Completed",
            OpportunityStatus::Canceled => "Canceled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }

    /// Only open or filled opportunities can still be canceled.
    pub fn is_cancellable(self) -> bool {
        matches!(self, OpportunityStatus::Open | OpportunityStatus::Filled)
    }
}

impl fmt::Display for OpportunityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub district: String,
    pub pincode: String,
    pub state: String,
}

impl Address {
    pub fn is_empty(&self) -> bool {
        [
            &self.street,
            &self.city,
            &self.district,
            &self.pincode,
            &self.state,
        ]
        .iter()
        .all(|field| field.trim().is_empty())
    }

    pub fn one_line(&self) -> String {
        [
            &self.street,
            &self.city,
            &self.district,
            &self.state,
            &self.pincode,
        ]
        .iter()
        .map(|field| field.trim())
        .filter(|field| !field.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub organization: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default, deserialize_with = "lenient_count")]
    pub volunteers: u32,
    #[serde(
        rename = "confirmedVolunteers",
        alias = "confirmed_volunteers",
        default,
        deserialize_with = "lenient_count"
    )]
    pub confirmed_volunteers: u32,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub skills: String,
    #[serde(default)]
    pub impact: String,
    #[serde(rename = "imageUrl", alias = "image", default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub status: OpportunityStatus,
}

impl Keyed for Opportunity {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Opportunity {
    pub fn skill_list(&self) -> impl Iterator<Item = &str> {
        split_skills(&self.skills)
    }

    pub fn duration_hours(&self) -> Option<f64> {
        parse_duration_hours(&self.duration)
    }

    pub fn calendar_date(&self) -> Option<jiff::civil::Date> {
        parse_calendar_date(&self.date)
    }

    pub fn date_label(&self) -> String {
        match self.calendar_date() {
            Some(date) => date.strftime("%B %d, %Y").to_string(),
            None => self.date.clone(),
        }
    }

    pub fn open_spots(&self) -> u32 {
        self.volunteers.saturating_sub(self.confirmed_volunteers)
    }
}

pub fn split_skills(skills: &str) -> impl Iterator<Item = &str> {
    skills.split(',').map(str::trim).filter(|s| !s.is_empty())
}

/// Parses the leading `YYYY-MM-DD` of a date or timestamp string.
pub fn parse_calendar_date(value: &str) -> Option<jiff::civil::Date> {
    value.get(..10)?.parse().ok()
}

/// Reads free-form durations such as "4 hours", "2.5 hrs" or "90 minutes".
pub fn parse_duration_hours(value: &str) -> Option<f64> {
    let value = value.trim();
    let split = value
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(value.len());
    let (number, unit) = value.split_at(split);
    let amount: f64 = number.parse().ok()?;
    let unit = unit.trim().to_lowercase();

    if unit.starts_with("min") {
        Some(amount / 60.0)
    } else {
        Some(amount)
    }
}

fn lenient_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Number(u32),
        Text(String),
        Null(()),
    }

    match Count::deserialize(deserializer)? {
        Count::Number(n) => Ok(n),
        Count::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
        Count::Null(()) => Ok(0),
    }
}

/// Editable opportunity fields as held by the create/edit form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpportunityDraft {
    pub title: String,
    pub organization: String,
    pub description: String,
    pub location: String,
    #[serde(default)]
    pub address: Address,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub duration: String,
    pub volunteers: u32,
    pub category: Category,
    pub skills: String,
    #[serde(default)]
    pub impact: String,
}

impl Default for OpportunityDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            organization: String::new(),
            description: String::new(),
            location: String::new(),
            address: Address::default(),
            date: String::new(),
            start_time: String::new(),
            end_time: String::new(),
            duration: String::new(),
            volunteers: 1,
            category: Category::default(),
            skills: String::new(),
            impact: String::new(),
        }
    }
}

impl From<&Opportunity> for OpportunityDraft {
    fn from(opportunity: &Opportunity) -> Self {
        Self {
            title: opportunity.title.clone(),
            organization: opportunity.organization.clone(),
            description: opportunity.description.clone(),
            location: opportunity.location.clone(),
            address: opportunity.address.clone().unwrap_or_default(),
            date: opportunity
                .calendar_date()
                .map(|d| d.to_string())
                .unwrap_or_else(|| opportunity.date.clone()),
            start_time: opportunity.start_time.clone(),
            end_time: opportunity.end_time.clone(),
            duration: opportunity.duration.clone(),
            volunteers: opportunity.volunteers,
            category: opportunity.category,
            skills: opportunity.skills.clone(),
            impact: opportunity.impact.clone(),
        }
    }
}

impl OpportunityDraft {
    /// Mirrors the form's input constraints. Times are not cross-checked.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("title", &self.title)?;
        require("organization", &self.organization)?;
        require("location", &self.location)?;
        require("date", &self.date)?;
        require("start_time", &self.start_time)?;
        require("end_time", &self.end_time)?;
        require("duration", &self.duration)?;
        if self.volunteers < 1 {
            return Err(ValidationError::new(
                "volunteers",
                "At least one volunteer is required",
            ));
        }
        require("description", &self.description)?;
        require("skills", &self.skills)?;

        let pincode = self.address.pincode.trim();
        if !pincode.is_empty() && !is_pincode(pincode) {
            return Err(ValidationError::new(
                "pincode",
                "Pincode must be exactly 6 digits",
            ));
        }
        Ok(())
    }

    /// Non-empty fields as multipart text parts, in form order.
    pub fn form_fields(&self) -> Result<Vec<(&'static str, String)>, serde_json::Error> {
        let mut fields = vec![
            ("title", self.title.clone()),
            ("organization", self.organization.clone()),
            ("description", self.description.clone()),
            ("location", self.location.clone()),
            ("date", self.date.clone()),
            ("start_time", self.start_time.clone()),
            ("end_time", self.end_time.clone()),
            ("duration", self.duration.clone()),
            ("volunteers", self.volunteers.to_string()),
            ("category", self.category.as_str().to_string()),
            ("skills", self.skills.clone()),
            ("impact", self.impact.clone()),
        ];
        if !self.address.is_empty() {
            fields.push(("address", serde_json::to_string(&self.address)?));
        }
        fields.retain(|(_, value)| !value.trim().is_empty());
        Ok(fields)
    }
}

fn is_pincode(value: &str) -> bool {
    value.len() == 6 && value.bytes().all(|b| b.is_ascii_digit())
}

/// An image picked in the browser, shipped to the server as base64.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    #[serde(with = "base64_bytes")]
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.bytes.len() > MAX_IMAGE_BYTES {
            return Err(ValidationError::new(
                "image",
                "Image size must be less than 5MB",
            ));
        }
        if !self.content_type.starts_with("image/") {
            return Err(ValidationError::new("image", "Only image files can be attached"));
        }
        Ok(())
    }

    pub fn data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.content_type,
            BASE64_STANDARD.encode(&self.bytes)
        )
    }
}

mod base64_bytes {
    use base64::{Engine, prelude::BASE64_STANDARD};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&BASE64_STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        BASE64_STANDARD
            .decode(s.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpportunityFilter {
    pub search: String,
    pub category: Choice<Category>,
    pub status: Choice<OpportunityStatus>,
}

impl Filter<Opportunity> for OpportunityFilter {
    fn matches(&self, opportunity: &Opportunity) -> bool {
        let fields = [
            opportunity.title.as_str(),
            opportunity.description.as_str(),
            opportunity.organization.as_str(),
        ];
        any_contains(fields, &self.search)
            && self.category.admits(&opportunity.category)
            && self.status.admits(&opportunity.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn opportunity(id: &str, title: &str, category: Category) -> Opportunity {
        Opportunity {
            id: id.into(),
            title: title.into(),
            organization: "Green Earth".into(),
            description: "Help out for a day".into(),
            location: "Central Park".into(),
            address: None,
            date: "2024-04-01".into(),
            start_time: "09:00".into(),
            end_time: "13:00".into(),
            duration: "4 hours".into(),
            volunteers: 10,
            confirmed_volunteers: 3,
            category,
            skills: "Gardening, Team Player,".into(),
            impact: String::new(),
            image_url: None,
            status: OpportunityStatus::Open,
        }
    }

    fn valid_draft() -> OpportunityDraft {
        OpportunityDraft::from(&opportunity("1", "Garden", Category::Environment))
    }

    #[test]
    fn deserializes_remote_shape() {
        let opportunity: Opportunity = serde_json::from_value(json!({
            "_id": "42",
            "title": "Beach Cleanup",
            "date": "2024-06-01T00:00:00.000Z",
            "volunteers": "12",
            "category": "Animal Welfare",
            "status": "Cancelled",
            "imageUrl": "/uploads/beach.png",
        }))
        .unwrap();

        assert_eq!(opportunity.volunteers, 12);
        assert_eq!(opportunity.confirmed_volunteers, 0);
        assert_eq!(opportunity.category, Category::AnimalWelfare);
        assert_eq!(opportunity.status, OpportunityStatus::Canceled);
        assert_eq!(opportunity.date_label(), "June 01, 2024");
        assert_eq!(OpportunityDraft::from(&opportunity).date, "2024-06-01");
    }

    #[test]
    fn skills_split_and_trim() {
        let opp = opportunity("1", "Garden", Category::Environment);
        assert_eq!(opp.skill_list().collect::<Vec<_>>(), vec!["Gardening", "Team Player"]);
        assert_eq!(opp.open_spots(), 7);
    }

    #[test]
    fn durations() {
        assert_eq!(parse_duration_hours("4 hours"), Some(4.0));
        assert_eq!(parse_duration_hours("2.5hrs"), Some(2.5));
        assert_eq!(parse_duration_hours("90 minutes"), Some(1.5));
        assert_eq!(parse_duration_hours("all day"), None);
    }

    #[test]
    fn zero_volunteers_is_rejected() {
        let draft = OpportunityDraft {
            volunteers: 0,
            ..valid_draft()
        };
        assert_eq!(draft.validate().unwrap_err().field, "volunteers");
        assert_eq!(valid_draft().validate(), Ok(()));
    }

    #[test]
    fn pincode_must_be_six_digits() {
        let mut draft = valid_draft();
        draft.address.pincode = "4110".into();
        assert_eq!(draft.validate().unwrap_err().field, "pincode");

        draft.address.pincode = "411001".into();
        assert_eq!(draft.validate(), Ok(()));
    }

    #[test]
    fn end_before_start_is_not_checked() {
        let draft = OpportunityDraft {
            start_time: "17:00".into(),
            end_time: "09:00".into(),
            ..valid_draft()
        };
        assert_eq!(draft.validate(), Ok(()));
    }

    #[test]
    fn form_fields_skip_empty_values() {
        let draft = OpportunityDraft {
            impact: String::new(),
            ..valid_draft()
        };
        let fields = draft.form_fields().unwrap();
        let names: Vec<_> = fields.iter().map(|(name, _)| *name).collect();

        assert!(!names.contains(&"impact"));
        assert!(!names.contains(&"address"));
        assert!(fields.contains(&("volunteers", "10".to_string())));
        assert!(fields.contains(&("category", "Environment".to_string())));
    }

    #[test]
    fn cleared_address_is_still_sent_as_json() {
        let draft = OpportunityDraft {
            address: Address::default(),
            ..valid_draft()
        };

        let body = serde_json::to_value(&draft).unwrap();
        assert_eq!(
            body["address"],
            json!({ "street": "", "city": "", "district": "", "pincode": "", "state": "" })
        );
    }

    #[test]
    fn address_travels_as_json_text() {
        let mut draft = valid_draft();
        draft.address.city = "Pune".into();
        let fields = draft.form_fields().unwrap();
        let (_, address) = fields.iter().find(|(name, _)| *name == "address").unwrap();
        let address: Address = serde_json::from_str(address).unwrap();
        assert_eq!(address.city, "Pune");
    }

    #[test]
    fn oversized_or_non_image_uploads_rejected() {
        let big = ImageUpload {
            file_name: "big.png".into(),
            content_type: "image/png".into(),
            bytes: vec![0; MAX_IMAGE_BYTES + 1],
        };
        assert_eq!(big.validate().unwrap_err().field, "image");

        let text = ImageUpload {
            file_name: "notes.txt".into(),
            content_type: "text/plain".into(),
            bytes: b"hi".to_vec(),
        };
        assert!(text.validate().is_err());
    }

    #[test]
    fn upload_round_trips_as_base64() {
        let upload = ImageUpload {
            file_name: "a.png".into(),
            content_type: "image/png".into(),
            bytes: vec![1, 2, 3],
        };
        let value = serde_json::to_value(&upload).unwrap();
        assert_eq!(value["bytes"], "AQID");
        assert_eq!(upload.data_url(), "data:image/png;base64,AQID");
    }

    #[test]
    fn filters_compose_like_a_conjunction() {
        let items = vec![
            opportunity("1", "Beach Cleanup", Category::Environment),
            opportunity("2", "Beach Reading Club", Category::Education),
            opportunity("3", "Tree Planting", Category::Environment),
        ];
        let search = OpportunityFilter {
            search: "beach".into(),
            ..Default::default()
        };
        let category = OpportunityFilter {
            category: Choice::Only(Category::Environment),
            ..Default::default()
        };
        let combined = OpportunityFilter {
            search: "beach".into(),
            category: Choice::Only(Category::Environment),
            ..Default::default()
        };

        let first_pass: Vec<Opportunity> = search.apply(&items).into_iter().cloned().collect();
        let chained: Vec<&Opportunity> = category.apply(&first_pass);
        let at_once = combined.apply(&items);

        assert_eq!(chained, at_once);
        assert_eq!(at_once.len(), 1);
        assert_eq!(at_once[0].id, "1");
        assert_eq!(search.clone().and(category).apply(&items), at_once);
    }
}
