use serde::{Deserialize, Serialize};

use crate::domain::classification::Classification;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowState {
    Start,
    Classified,
    BugExtraction,
    FeatureExtraction,
    InquiryExtraction,
    Terminal,
}

impl FlowState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowEvent {
    ClassificationCompleted,
    RouteSelected,
    ExtractionCompleted,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FlowContext {
    pub classification: Option<Classification>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowAction {
    RouteMessage,
    ExtractBugReport,
    ExtractFeatureRequest,
    ExtractGeneralInquiry,
    RespondToCustomer,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub from: FlowState,
    pub to: FlowState,
    pub event: FlowEvent,
    pub actions: Vec<FlowAction>,
}
