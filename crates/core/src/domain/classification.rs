use std::fmt;

use serde::{Deserialize, Serialize};

/// Category assigned to an inbound customer message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    BugReport,
    FeatureRequest,
    GeneralInquiry,
}

impl Classification {
    pub const ALL: [Classification; 3] =
        [Classification::BugReport, Classification::FeatureRequest, Classification::GeneralInquiry];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BugReport => "bug_report",
            Self::FeatureRequest => "feature_request",
            Self::GeneralInquiry => "general_inquiry",
        }
    }

    /// Parses a backend label. Surrounding whitespace, quotes and case are ignored; anything
    /// outside the three known labels yields `None`.
    pub fn from_label(raw: &str) -> Option<Self> {
        let normalized = raw.trim().trim_matches(|c| c == '"' || c == '\'').to_ascii_lowercase();
        match normalized.as_str() {
            "bug_report" => Some(Self::BugReport),
            "feature_request" => Some(Self::FeatureRequest),
            "general_inquiry" => Some(Self::GeneralInquiry),
            _ => None,
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Clamps a backend confidence score into `[0, 1]`; NaN becomes `0`.
pub fn normalize_confidence(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}
