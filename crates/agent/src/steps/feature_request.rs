use schemars::JsonSchema;
use serde::Deserialize;
use supportdesk_core::catalog::ProductRef;
use supportdesk_core::domain::records::{
    BusinessValue, FeatureRequestDraft, ProductRequirement, UNKNOWN_VALUE,
};
use supportdesk_core::domain::ticket::{TicketKind, TicketSequence};
use tracing::warn;

use crate::llm::{complete_as, CompletionClient, CompletionRequest, ResponseSchema};
use crate::prompts;
use crate::steps::{
    null_as_default, or_unknown, string_or_list, text_or_unknown, unknown_value, StepOutcome,
};

pub const SCHEMA_NAME: &str = "feature_request";

const TRACKED_FIELDS: [&str; 4] = ["title", "description", "user_story", "affected_components"];

#[derive(Clone, Debug, Deserialize, JsonSchema)]
pub struct FeatureRequestAnswer {
    #[serde(default = "unknown_value", deserialize_with = "text_or_unknown")]
    #[schemars(with = "String")]
    pub title: String,
    #[serde(default = "unknown_value", deserialize_with = "text_or_unknown")]
    #[schemars(with = "String")]
    pub description: String,
    #[serde(default = "unknown_value", deserialize_with = "text_or_unknown")]
    #[schemars(with = "String")]
    pub user_story: String,
    /// `High`, `Medium` or `Low`.
    #[serde(default, deserialize_with = "null_as_default")]
    #[schemars(with = "String")]
    pub business_value: String,
    #[serde(default, deserialize_with = "string_or_list")]
    #[schemars(with = "Vec<String>")]
    pub affected_components: Vec<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    #[schemars(with = "Vec<String>")]
    pub missing_fields: Vec<String>,
}

impl FeatureRequestAnswer {
    pub fn fallback() -> Self {
        Self {
            title: unknown_value(),
            description: unknown_value(),
            user_story: unknown_value(),
            business_value: String::new(),
            affected_components: vec![unknown_value()],
            missing_fields: TRACKED_FIELDS.iter().map(|field| field.to_string()).collect(),
        }
    }

    pub fn into_draft(self) -> FeatureRequestDraft {
        let title = or_unknown(self.title);
        let description = or_unknown(self.description);
        let user_story = or_unknown(self.user_story);

        let mut missing_fields = self.missing_fields;
        for (field, unknown) in [
            ("title", title == UNKNOWN_VALUE),
            ("description", description == UNKNOWN_VALUE),
            ("user_story", user_story == UNKNOWN_VALUE),
            (
                "affected_components",
                self.affected_components.is_empty()
                    || self.affected_components.iter().all(|c| c == UNKNOWN_VALUE),
            ),
        ] {
            if unknown && !missing_fields.iter().any(|existing| existing == field) {
                missing_fields.push(field.to_string());
            }
        }

        FeatureRequestDraft {
            title,
            description,
            user_story,
            business_value: BusinessValue::from_label(&self.business_value).unwrap_or_default(),
            affected_components: self.affected_components,
            missing_fields,
        }
    }
}

pub async fn extract_feature_request(
    client: &dyn CompletionClient,
    model: &str,
    message: &str,
    product: ProductRef<'_>,
    sequence: &dyn TicketSequence,
) -> StepOutcome<ProductRequirement> {
    let request = CompletionRequest {
        model: model.to_string(),
        messages: prompts::feature_request(
            message,
            &product.profile.component_names(),
            &product.profile.description,
        ),
        schema: ResponseSchema::of::<FeatureRequestAnswer>(SCHEMA_NAME),
    };

    let (answer, fallback) = match complete_as::<FeatureRequestAnswer>(client, request).await {
        Ok(answer) => (answer, None),
        Err(error) => {
            warn!(
                event_name = "triage.feature_request.fallback",
                product = product.name,
                error_kind = error.kind(),
                error = %error,
                "feature request extraction failed; recording placeholder requirement"
            );
            (FeatureRequestAnswer::fallback(), Some(error))
        }
    };

    let requirement =
        ProductRequirement::new(sequence.next_id(TicketKind::FeatureRequest), answer.into_draft());
    StepOutcome { value: requirement, fallback }
}
