//! Structured records produced by the extraction steps.
//!
//! [`ResponseData`] is the tagged union returned to callers. Its serialized shape keeps the
//! established wire contract: bug tickets are nested under `ticket`, feature requests under
//! `product_requirement`, inquiries are flat, and the empty payload is `{}`.

use serde::{Deserialize, Serialize};

use crate::domain::classification::Classification;
use crate::domain::ticket::TicketId;

/// Placeholder for any field the backend could not infer from the message.
pub const UNKNOWN_VALUE: &str = "UNKNOWN_VALUE";

/// Inquiry category used when the message does not fit a configured category.
pub const OTHER_CATEGORY: &str = "Other";

pub const BUG_SEVERITY: &str = "Medium";
pub const BUG_PRIORITY: &str = "High";
pub const FEATURE_COMPLEXITY_ESTIMATE: &str = "Medium";
pub const FEATURE_STATUS: &str = "Under Review";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BugTicket {
    pub id: TicketId,
    pub title: String,
    pub reproduction_steps: Vec<String>,
    pub affected_components: Vec<String>,
    pub severity: String,
    pub priority: String,
    pub assigned_team: Vec<String>,
}

impl BugTicket {
    pub fn new(
        id: TicketId,
        title: String,
        reproduction_steps: Vec<String>,
        affected_components: Vec<String>,
        assigned_team: Vec<String>,
    ) -> Self {
        Self {
            id,
            title,
            reproduction_steps,
            affected_components,
            severity: BUG_SEVERITY.to_string(),
            priority: BUG_PRIORITY.to_string(),
            assigned_team,
        }
    }

    pub fn acknowledgement(&self) -> String {
        format!("Thank you for your bug report. Your report has been recorded with ID {}.", self.id)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BusinessValue {
    High,
    #[default]
    Medium,
    Low,
}

impl BusinessValue {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    pub fn from_label(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRequirement {
    pub id: TicketId,
    pub title: String,
    pub description: String,
    pub user_story: String,
    pub business_value: BusinessValue,
    pub complexity_estimate: String,
    pub affected_components: Vec<String>,
    pub status: String,
    #[serde(default)]
    pub missing_fields: Vec<String>,
}

/// Fields of a feature request as extracted from the message, before an id is assigned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeatureRequestDraft {
    pub title: String,
    pub description: String,
    pub user_story: String,
    pub business_value: BusinessValue,
    pub affected_components: Vec<String>,
    pub missing_fields: Vec<String>,
}

impl ProductRequirement {
    pub fn new(id: TicketId, draft: FeatureRequestDraft) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description,
            user_story: draft.user_story,
            business_value: draft.business_value,
            complexity_estimate: FEATURE_COMPLEXITY_ESTIMATE.to_string(),
            affected_components: draft.affected_components,
            status: FEATURE_STATUS.to_string(),
            missing_fields: draft.missing_fields,
        }
    }

    pub fn acknowledgement(&self) -> String {
        format!(
            "Thank you for your feature request. Your request has been recorded with ID {}.",
            self.id
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InquiryRecord {
    pub inquiry_category: String,
    pub requires_human_review: bool,
    pub suggested_resources: Vec<String>,
}

impl InquiryRecord {
    pub fn is_other(&self) -> bool {
        self.inquiry_category == OTHER_CATEGORY
    }

    pub fn acknowledgement(&self) -> &'static str {
        if self.is_other() {
            "Thank you for your inquiry. Your inquiry has been noted, you will be contacted for further assistance."
        } else {
            "Thank you for your inquiry. Please refer to the following resources or wait for further assistance."
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseData {
    BugReport { ticket: BugTicket },
    FeatureRequest { product_requirement: ProductRequirement },
    GeneralInquiry(InquiryRecord),
    Empty {},
}

impl ResponseData {
    pub fn empty() -> Self {
        Self::Empty {}
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty {})
    }

    pub fn classification(&self) -> Option<Classification> {
        match self {
            Self::BugReport { .. } => Some(Classification::BugReport),
            Self::FeatureRequest { .. } => Some(Classification::FeatureRequest),
            Self::GeneralInquiry(_) => Some(Classification::GeneralInquiry),
            Self::Empty {} => None,
        }
    }

    pub fn ticket_id(&self) -> Option<&TicketId> {
        match self {
            Self::BugReport { ticket } => Some(&ticket.id),
            Self::FeatureRequest { product_requirement } => Some(&product_requirement.id),
            Self::GeneralInquiry(_) | Self::Empty {} => None,
        }
    }
}

impl Default for ResponseData {
    fn default() -> Self {
        Self::empty()
    }
}
