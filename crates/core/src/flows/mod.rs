pub mod engine;
pub mod router;
pub mod states;

pub use engine::{FlowDefinition, FlowEngine, FlowTransitionError, TriageFlow};
pub use router::{route, route_label, ExtractionRoute};
pub use states::{FlowAction, FlowContext, FlowEvent, FlowState, TransitionOutcome};
