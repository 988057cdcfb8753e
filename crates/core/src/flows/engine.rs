use thiserror::Error;

use crate::audit::{AuditCategory, AuditContext, AuditOutcome, AuditSink};
use crate::flows::router::route;
use crate::flows::states::{FlowAction, FlowContext, FlowEvent, FlowState, TransitionOutcome};

pub trait FlowDefinition {
    fn initial_state(&self) -> FlowState;
    fn transition(
        &self,
        current: &FlowState,
        event: &FlowEvent,
        context: &FlowContext,
    ) -> Result<TransitionOutcome, FlowTransitionError>;
}

/// Classify, route, extract, done. A single pass with no cycles.
#[derive(Clone, Debug, Default)]
pub struct TriageFlow;

impl FlowDefinition for TriageFlow {
    fn initial_state(&self) -> FlowState {
        FlowState::Start
    }

    fn transition(
        &self,
        current: &FlowState,
        event: &FlowEvent,
        context: &FlowContext,
    ) -> Result<TransitionOutcome, FlowTransitionError> {
        transition_triage(current, event, context)
    }
}

pub struct FlowEngine<F> {
    flow: F,
}

impl<F> FlowEngine<F>
where
    F: FlowDefinition,
{
    pub fn new(flow: F) -> Self {
        Self { flow }
    }

    pub fn initial_state(&self) -> FlowState {
        self.flow.initial_state()
    }

    pub fn apply(
        &self,
        current: &FlowState,
        event: &FlowEvent,
        context: &FlowContext,
    ) -> Result<TransitionOutcome, FlowTransitionError> {
        self.flow.transition(current, event, context)
    }

    pub fn apply_with_audit<S>(
        &self,
        current: &FlowState,
        event: &FlowEvent,
        context: &FlowContext,
        sink: &S,
        audit: &AuditContext,
    ) -> Result<TransitionOutcome, FlowTransitionError>
    where
        S: AuditSink + ?Sized,
    {
        let result = self.apply(current, event, context);
        match &result {
            Ok(outcome) => {
                sink.emit(
                    audit
                        .event("flow.transition_applied", AuditCategory::Flow, AuditOutcome::Success)
                        .with_metadata("from", format!("{:?}", outcome.from))
                        .with_metadata("to", format!("{:?}", outcome.to))
                        .with_metadata("event", format!("{:?}", outcome.event)),
                );
            }
            Err(error) => {
                sink.emit(
                    audit
                        .event("flow.transition_rejected", AuditCategory::Flow, AuditOutcome::Rejected)
                        .with_metadata("error", error.to_string()),
                );
            }
        }
        result
    }
}

impl Default for FlowEngine<TriageFlow> {
    fn default() -> Self {
        Self::new(TriageFlow)
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FlowTransitionError {
    #[error("invalid transition from {state:?} using event {event:?}")]
    InvalidTransition { state: FlowState, event: FlowEvent },
}

fn transition_triage(
    current: &FlowState,
    event: &FlowEvent,
    context: &FlowContext,
) -> Result<TransitionOutcome, FlowTransitionError> {
    use FlowEvent::{ClassificationCompleted, ExtractionCompleted, RouteSelected};
    use FlowState::{
        BugExtraction, Classified, FeatureExtraction, InquiryExtraction, Start, Terminal,
    };

    let (to, actions) = match (current, event) {
        (Start, ClassificationCompleted) => (Classified, vec![FlowAction::RouteMessage]),
        (Classified, RouteSelected) => {
            let route = route(context.classification);
            (route.state(), vec![route.action()])
        }
        (BugExtraction, ExtractionCompleted)
        | (FeatureExtraction, ExtractionCompleted)
        | (InquiryExtraction, ExtractionCompleted) => {
            (Terminal, vec![FlowAction::RespondToCustomer])
        }
        _ => {
            return Err(FlowTransitionError::InvalidTransition { state: *current, event: *event });
        }
    };

    Ok(TransitionOutcome { from: *current, to, event: *event, actions })
}

#[cfg(test)]
mod tests {
    use crate::audit::{AuditContext, InMemoryAuditSink};
    use crate::domain::classification::Classification;
    use crate::flows::engine::{FlowEngine, FlowTransitionError, TriageFlow};
    use crate::flows::states::{FlowAction, FlowContext, FlowEvent, FlowState};

    fn run_to_terminal(
        engine: &FlowEngine<TriageFlow>,
        classification: Option<Classification>,
    ) -> Vec<FlowState> {
        let context = FlowContext { classification };
        let mut visited = vec![engine.initial_state()];
        for event in
            [FlowEvent::ClassificationCompleted, FlowEvent::RouteSelected, FlowEvent::ExtractionCompleted]
        {
            let current = *visited.last().expect("at least the initial state");
            let outcome = engine.apply(&current, &event, &context).expect("valid transition");
            visited.push(outcome.to);
        }
        visited
    }

    #[test]
    fn bug_reports_take_the_bug_extraction_branch() {
        let engine = FlowEngine::default();
        let visited = run_to_terminal(&engine, Some(Classification::BugReport));

        assert_eq!(
            visited,
            vec![
                FlowState::Start,
                FlowState::Classified,
                FlowState::BugExtraction,
                FlowState::Terminal
            ]
        );
    }

    #[test]
    fn feature_requests_take_the_feature_extraction_branch() {
        let engine = FlowEngine::new(TriageFlow);
        let visited = run_to_terminal(&engine, Some(Classification::FeatureRequest));
        assert_eq!(visited[2], FlowState::FeatureExtraction);
    }

    #[test]
    fn unclassified_messages_are_routed_to_inquiry_extraction() {
        let engine = FlowEngine::default();
        let outcome = engine
            .apply(&FlowState::Classified, &FlowEvent::RouteSelected, &FlowContext::default())
            .expect("routing is total");

        assert_eq!(outcome.to, FlowState::InquiryExtraction);
        assert_eq!(outcome.actions, vec![FlowAction::ExtractGeneralInquiry]);
    }

    #[test]
    fn terminal_state_accepts_no_further_events() {
        let engine = FlowEngine::default();
        for event in
            [FlowEvent::ClassificationCompleted, FlowEvent::RouteSelected, FlowEvent::ExtractionCompleted]
        {
            let error = engine
                .apply(&FlowState::Terminal, &event, &FlowContext::default())
                .expect_err("terminal is final");
            assert!(matches!(
                error,
                FlowTransitionError::InvalidTransition { state: FlowState::Terminal, .. }
            ));
        }
    }

    #[test]
    fn extraction_cannot_be_skipped() {
        let engine = FlowEngine::default();
        let error = engine
            .apply(&FlowState::Start, &FlowEvent::ExtractionCompleted, &FlowContext::default())
            .expect_err("start cannot jump to terminal");

        assert_eq!(
            error,
            FlowTransitionError::InvalidTransition {
                state: FlowState::Start,
                event: FlowEvent::ExtractionCompleted
            }
        );
    }

    #[test]
    fn replay_is_deterministic_for_same_classification() {
        let engine = FlowEngine::default();
        let first = run_to_terminal(&engine, Some(Classification::GeneralInquiry));
        let second = run_to_terminal(&engine, Some(Classification::GeneralInquiry));
        assert_eq!(first, second);
    }

    #[test]
    fn flow_transition_emits_audit_event() {
        let engine = FlowEngine::default();
        let sink = InMemoryAuditSink::default();

        let _ = engine
            .apply_with_audit(
                &FlowState::Start,
                &FlowEvent::ClassificationCompleted,
                &FlowContext::default(),
                &sink,
                &AuditContext::new(Some("u1".to_owned()), Some("MobileApp".to_owned()), "req-42", "flow-engine"),
            )
            .expect("transition should succeed");

        let _ = engine.apply_with_audit(
            &FlowState::Terminal,
            &FlowEvent::RouteSelected,
            &FlowContext::default(),
            &sink,
            &AuditContext::new(None, None, "req-42", "flow-engine"),
        );

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].correlation_id, "req-42");
        assert_eq!(events[0].event_type, "flow.transition_applied");
        assert_eq!(events[0].metadata.get("to").map(String::as_str), Some("Classified"));
        assert_eq!(events[1].event_type, "flow.transition_rejected");
    }
}
