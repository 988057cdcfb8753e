//! Routing from a classification to the extraction step that handles it.

use serde::{Deserialize, Serialize};

use crate::domain::classification::Classification;
use crate::flows::states::{FlowAction, FlowState};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExtractionRoute {
    BugReport,
    FeatureRequest,
    GeneralInquiry,
}

impl ExtractionRoute {
    pub fn state(&self) -> FlowState {
        match self {
            Self::BugReport => FlowState::BugExtraction,
            Self::FeatureRequest => FlowState::FeatureExtraction,
            Self::GeneralInquiry => FlowState::InquiryExtraction,
        }
    }

    pub fn action(&self) -> FlowAction {
        match self {
            Self::BugReport => FlowAction::ExtractBugReport,
            Self::FeatureRequest => FlowAction::ExtractFeatureRequest,
            Self::GeneralInquiry => FlowAction::ExtractGeneralInquiry,
        }
    }

    pub fn from_state(state: FlowState) -> Option<Self> {
        match state {
            FlowState::BugExtraction => Some(Self::BugReport),
            FlowState::FeatureExtraction => Some(Self::FeatureRequest),
            FlowState::InquiryExtraction => Some(Self::GeneralInquiry),
            FlowState::Start | FlowState::Classified | FlowState::Terminal => None,
        }
    }
}

/// Total: a missing classification goes to the general-inquiry extractor.
pub fn route(classification: Option<Classification>) -> ExtractionRoute {
    match classification {
        Some(Classification::BugReport) => ExtractionRoute::BugReport,
        Some(Classification::FeatureRequest) => ExtractionRoute::FeatureRequest,
        Some(Classification::GeneralInquiry) | None => ExtractionRoute::GeneralInquiry,
    }
}

/// Routes a raw label; empty or unrecognised labels fall back to general inquiry.
pub fn route_label(label: &str) -> ExtractionRoute {
    route(Classification::from_label(label))
}
