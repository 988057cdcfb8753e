use std::sync::Arc;

use supportdesk_core::audit::{
    AuditCategory, AuditContext, AuditOutcome, AuditSink, TracingAuditSink,
};
use supportdesk_core::catalog::{ProductCatalog, ProductRef};
use supportdesk_core::domain::records::ResponseData;
use supportdesk_core::domain::state::{CustomerMessage, ProcessedMessage, WorkflowState};
use supportdesk_core::domain::ticket::{AtomicTicketSequence, TicketSequence};
use supportdesk_core::errors::{ApplicationError, DomainError};
use supportdesk_core::flows::{
    ExtractionRoute, FlowContext, FlowEngine, FlowEvent, FlowState, TriageFlow,
};
use tracing::{info, warn};

use crate::llm::{CompletionClient, CompletionError};
use crate::steps::bug_report::extract_bug_report;
use crate::steps::classification::classify;
use crate::steps::feature_request::extract_feature_request;
use crate::steps::general_inquiry::extract_general_inquiry;

const AUDIT_ACTOR: &str = "triage-runtime";

/// Runs customer messages through classify, route, and extract.
///
/// Cheap to share: every collaborator sits behind an `Arc`, and a single runtime serves
/// any number of concurrent requests.
#[derive(Clone)]
pub struct TriageRuntime {
    catalog: Arc<ProductCatalog>,
    client: Arc<dyn CompletionClient>,
    sequence: Arc<dyn TicketSequence>,
    audit_sink: Arc<dyn AuditSink>,
    engine: Arc<FlowEngine<TriageFlow>>,
    model: String,
}

impl TriageRuntime {
    pub fn new(
        catalog: Arc<ProductCatalog>,
        client: Arc<dyn CompletionClient>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            catalog,
            client,
            sequence: Arc::new(AtomicTicketSequence::new()),
            audit_sink: Arc::new(TracingAuditSink),
            engine: Arc::new(FlowEngine::default()),
            model: model.into(),
        }
    }

    pub fn with_sequence(mut self, sequence: Arc<dyn TicketSequence>) -> Self {
        self.sequence = sequence;
        self
    }

    pub fn with_audit_sink(mut self, audit_sink: Arc<dyn AuditSink>) -> Self {
        self.audit_sink = audit_sink;
        self
    }

    pub fn catalog(&self) -> &ProductCatalog {
        &self.catalog
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn process(
        &self,
        input: CustomerMessage,
        correlation_id: &str,
    ) -> Result<ProcessedMessage, ApplicationError> {
        let audit = AuditContext::new(
            Some(input.customer_id.clone()),
            Some(input.product.clone()),
            correlation_id,
            AUDIT_ACTOR,
        );

        let Some(product) = self.catalog.get(&input.product) else {
            warn!(
                event_name = "triage.product.invalid",
                correlation_id,
                product = %input.product,
                "rejecting message for unknown product"
            );
            self.audit_sink.emit(
                audit
                    .event("triage.product_rejected", AuditCategory::Ingress, AuditOutcome::Rejected)
                    .with_metadata("product", input.product.clone()),
            );
            return Ok(ProcessedMessage::invalid_product());
        };

        info!(
            event_name = "triage.message.received",
            correlation_id,
            product = product.name,
            customer_id = %input.customer_id,
            "processing customer message"
        );

        let mut state = WorkflowState::new(input);
        let mut current = self.engine.initial_state();

        let verdict = classify(self.client.as_ref(), &self.model, state.message_text()).await;
        self.audit_step(&audit, AuditCategory::Classification, "triage.classified", &verdict.fallback);
        state.record_classification(verdict.value.classification, verdict.value.confidence_score)?;
        current = self.advance(&current, FlowEvent::ClassificationCompleted, &state, &audit)?;

        current = self.advance(&current, FlowEvent::RouteSelected, &state, &audit)?;
        let route = ExtractionRoute::from_state(current).ok_or_else(|| {
            DomainError::InvariantViolation(format!("router selected non-extraction state {current:?}"))
        })?;

        let (customer_response, response_data) = self.extract(route, &state, product, &audit).await;
        state.record_extraction(customer_response, response_data)?;
        current = self.advance(&current, FlowEvent::ExtractionCompleted, &state, &audit)?;

        if !current.is_terminal() {
            return Err(DomainError::InvariantViolation(format!(
                "workflow finished in non-terminal state {current:?}"
            ))
            .into());
        }

        let processed = state.into_processed();
        info!(
            event_name = "triage.message.completed",
            correlation_id,
            product = product.name,
            message_type = %processed.message_type,
            confidence_score = processed.confidence_score,
            ticket_id = processed.response_data.ticket_id().map(|id| id.0.as_str()).unwrap_or("none"),
            "customer message processed"
        );
        Ok(processed)
    }

    async fn extract(
        &self,
        route: ExtractionRoute,
        state: &WorkflowState,
        product: ProductRef<'_>,
        audit: &AuditContext,
    ) -> (String, ResponseData) {
        let client = self.client.as_ref();
        let message = state.message_text();

        match route {
            ExtractionRoute::BugReport => {
                let outcome =
                    extract_bug_report(client, &self.model, message, product, self.sequence.as_ref())
                        .await;
                self.audit_step(
                    audit,
                    AuditCategory::Extraction,
                    "triage.bug_report.recorded",
                    &outcome.fallback,
                );
                let ticket = outcome.value;
                (ticket.acknowledgement(), ResponseData::BugReport { ticket })
            }
            ExtractionRoute::FeatureRequest => {
                let outcome = extract_feature_request(
                    client,
                    &self.model,
                    message,
                    product,
                    self.sequence.as_ref(),
                )
                .await;
                self.audit_step(
                    audit,
                    AuditCategory::Extraction,
                    "triage.feature_request.recorded",
                    &outcome.fallback,
                );
                let product_requirement = outcome.value;
                (
                    product_requirement.acknowledgement(),
                    ResponseData::FeatureRequest { product_requirement },
                )
            }
            ExtractionRoute::GeneralInquiry => {
                let outcome = extract_general_inquiry(client, &self.model, message, product).await;
                self.audit_step(
                    audit,
                    AuditCategory::Extraction,
                    "triage.general_inquiry.recorded",
                    &outcome.fallback,
                );
                let record = outcome.value;
                (record.acknowledgement().to_string(), ResponseData::GeneralInquiry(record))
            }
        }
    }

    fn advance(
        &self,
        current: &FlowState,
        event: FlowEvent,
        state: &WorkflowState,
        audit: &AuditContext,
    ) -> Result<FlowState, DomainError> {
        let context = FlowContext { classification: state.classification() };
        let outcome = self.engine.apply_with_audit(
            current,
            &event,
            &context,
            self.audit_sink.as_ref(),
            audit,
        )?;
        Ok(outcome.to)
    }

    fn audit_step(
        &self,
        audit: &AuditContext,
        category: AuditCategory,
        event_type: &str,
        fallback: &Option<CompletionError>,
    ) {
        let event = match fallback {
            None => audit.event(event_type, category, AuditOutcome::Success),
            Some(error) => audit
                .event(event_type, category, AuditOutcome::Degraded)
                .with_metadata("error_kind", error.kind())
                .with_metadata("error", error.to_string()),
        };
        self.audit_sink.emit(event);
    }
}
