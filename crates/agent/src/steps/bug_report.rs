use schemars::JsonSchema;
use serde::Deserialize;
use supportdesk_core::catalog::ProductRef;
use supportdesk_core::domain::records::BugTicket;
use supportdesk_core::domain::ticket::{TicketKind, TicketSequence};
use tracing::warn;

use crate::llm::{complete_as, CompletionClient, CompletionRequest, ResponseSchema};
use crate::prompts;
use crate::steps::{or_unknown, string_or_list, text_or_unknown, unknown_value, StepOutcome};

pub const SCHEMA_NAME: &str = "bug_report";

#[derive(Clone, Debug, Deserialize, JsonSchema)]
pub struct BugReportAnswer {
    #[serde(default = "unknown_value", deserialize_with = "text_or_unknown")]
    #[schemars(with = "String")]
    pub title: String,
    #[serde(default, deserialize_with = "string_or_list")]
    #[schemars(with = "Vec<String>")]
    pub reproduction_steps: Vec<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    #[schemars(with = "Vec<String>")]
    pub affected_components: Vec<String>,
}

impl Default for BugReportAnswer {
    fn default() -> Self {
        Self {
            title: unknown_value(),
            reproduction_steps: Vec::new(),
            affected_components: Vec::new(),
        }
    }
}

/// Extracts a bug ticket. The ticket id is allocated even when the backend fails, so the
/// customer always receives a reference.
pub async fn extract_bug_report(
    client: &dyn CompletionClient,
    model: &str,
    message: &str,
    product: ProductRef<'_>,
    sequence: &dyn TicketSequence,
) -> StepOutcome<BugTicket> {
    let request = CompletionRequest {
        model: model.to_string(),
        messages: prompts::bug_report(message, &product.profile.component_names()),
        schema: ResponseSchema::of::<BugReportAnswer>(SCHEMA_NAME),
    };

    let (answer, fallback) = match complete_as::<BugReportAnswer>(client, request).await {
        Ok(answer) => (answer, None),
        Err(error) => {
            warn!(
                event_name = "triage.bug_report.fallback",
                product = product.name,
                error_kind = error.kind(),
                error = %error,
                "bug report extraction failed; recording default ticket"
            );
            (BugReportAnswer::default(), Some(error))
        }
    };

    let assigned_team = product.profile.assign_teams(&answer.affected_components);
    let ticket = BugTicket::new(
        sequence.next_id(TicketKind::Bug),
        or_unknown(answer.title),
        answer.reproduction_steps,
        answer.affected_components,
        assigned_team,
    );

    StepOutcome { value: ticket, fallback }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use supportdesk_core::domain::records::UNKNOWN_VALUE;
    use supportdesk_core::domain::ticket::{AtomicTicketSequence, TicketId};

    use super::{extract_bug_report, SCHEMA_NAME};
    use crate::llm::{CompletionError, ScriptedCompletionClient};
    use crate::steps::sample_catalog;

    #[tokio::test]
    async fn teams_follow_components_positionally_with_tbd_for_unmapped() {
        let catalog = sample_catalog();
        let product = catalog.get("MobileApp").expect("product");
        let client = ScriptedCompletionClient::new().with_reply(
            SCHEMA_NAME,
            json!({
                "title": "Login Issue",
                "reproduction_steps": ["Open app", "Enter credentials", "Tap login"],
                "affected_components": ["Authentication Module", "Camera", "Authentication Module"]
            }),
        );
        let sequence = AtomicTicketSequence::new();

        let outcome = extract_bug_report(&client, "m", "I can't log in", product, &sequence).await;
        let ticket = outcome.value;

        assert!(outcome.fallback.is_none());
        assert_eq!(ticket.id, TicketId("BUG-1".to_string()));
        assert_eq!(ticket.title, "Login Issue");
        assert_eq!(
            ticket.assigned_team,
            vec!["Identity Team".to_string(), "TBD".to_string(), "Identity Team".to_string()]
        );
        assert_eq!(ticket.assigned_team.len(), ticket.affected_components.len());
        assert_eq!(ticket.severity, "Medium");
        assert_eq!(ticket.priority, "High");
        assert!(client.calls()[0].messages[1].content.contains("'Authentication Module'"));
    }

    #[tokio::test]
    async fn missing_fields_default_individually() {
        let catalog = sample_catalog();
        let product = catalog.get("MobileApp").expect("product");
        let client = ScriptedCompletionClient::new()
            .with_reply(SCHEMA_NAME, json!({ "affected_components": "Payments" }));
        let sequence = AtomicTicketSequence::new();

        let ticket =
            extract_bug_report(&client, "m", "payment broke", product, &sequence).await.value;

        assert_eq!(ticket.title, UNKNOWN_VALUE);
        assert!(ticket.reproduction_steps.is_empty());
        assert_eq!(ticket.affected_components, vec!["Payments".to_string()]);
        assert_eq!(ticket.assigned_team, vec!["Payments Team".to_string()]);
    }

    #[tokio::test]
    async fn backend_failure_still_records_a_default_ticket() {
        let catalog = sample_catalog();
        let product = catalog.get("MobileApp").expect("product");
        let client = ScriptedCompletionClient::new().with_failure(
            SCHEMA_NAME,
            CompletionError::BackendUnavailable("timeout".to_string()),
        );
        let sequence = AtomicTicketSequence::starting_at(7, 1);

        let outcome = extract_bug_report(&client, "m", "crash", product, &sequence).await;

        assert!(outcome.is_degraded());
        assert_eq!(outcome.value.id, TicketId("BUG-7".to_string()));
        assert_eq!(outcome.value.title, UNKNOWN_VALUE);
        assert!(outcome.value.affected_components.is_empty());
        assert!(outcome.value.assigned_team.is_empty());
        assert!(outcome.value.acknowledgement().contains("BUG-7"));
    }

    #[tokio::test]
    async fn null_title_keeps_the_extracted_lists() {
        let catalog = sample_catalog();
        let product = catalog.get("MobileApp").expect("product");
        let client = ScriptedCompletionClient::new().with_reply(
            SCHEMA_NAME,
            json!({
                "title": null,
                "reproduction_steps": ["Open app"],
                "affected_components": ["Payments"]
            }),
        );
        let sequence = AtomicTicketSequence::new();

        let outcome = extract_bug_report(&client, "m", "payments fail", product, &sequence).await;

        assert!(!outcome.is_degraded());
        assert_eq!(outcome.value.title, UNKNOWN_VALUE);
        assert_eq!(outcome.value.reproduction_steps, vec!["Open app".to_string()]);
        assert_eq!(outcome.value.affected_components, vec!["Payments".to_string()]);
        assert_eq!(outcome.value.assigned_team, vec!["Payments Team".to_string()]);
    }
}
