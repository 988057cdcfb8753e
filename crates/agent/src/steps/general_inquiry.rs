use schemars::JsonSchema;
use serde::{Deserialize, Deserializer};
use supportdesk_core::catalog::ProductRef;
use supportdesk_core::domain::records::{InquiryRecord, OTHER_CATEGORY};
use tracing::warn;

use crate::llm::{complete_as, CompletionClient, CompletionRequest, ResponseSchema};
use crate::prompts;
use crate::steps::{null_as_default, StepOutcome};

pub const SCHEMA_NAME: &str = "general_inquiry";

fn other_category() -> String {
    OTHER_CATEGORY.to_string()
}

fn category_or_other<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(other_category))
}

#[derive(Clone, Debug, Deserialize, JsonSchema)]
pub struct InquiryAnswer {
    #[serde(default = "other_category", deserialize_with = "category_or_other")]
    #[schemars(with = "String")]
    pub inquiry_category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    #[schemars(with = "bool")]
    pub requires_human_review: bool,
}

impl InquiryAnswer {
    pub fn fallback() -> Self {
        Self { inquiry_category: other_category(), requires_human_review: true }
    }

    /// Resolves the answer against the product's configured categories. Unknown categories
    /// collapse to `Other`, and `Other` always goes to a human.
    pub fn resolve(self, product: ProductRef<'_>) -> InquiryRecord {
        let wanted = self.inquiry_category.trim();
        let matched = product
            .profile
            .inquiry_categories()
            .into_iter()
            .find(|category| *category == wanted)
            .or_else(|| {
                product
                    .profile
                    .inquiry_categories()
                    .into_iter()
                    .find(|category| category.eq_ignore_ascii_case(wanted))
            });

        let inquiry_category = matched.unwrap_or(OTHER_CATEGORY).to_string();
        let is_other = inquiry_category == OTHER_CATEGORY;

        InquiryRecord {
            suggested_resources: product.profile.resources_for(&inquiry_category),
            requires_human_review: self.requires_human_review || is_other,
            inquiry_category,
        }
    }
}

pub async fn extract_general_inquiry(
    client: &dyn CompletionClient,
    model: &str,
    message: &str,
    product: ProductRef<'_>,
) -> StepOutcome<InquiryRecord> {
    let request = CompletionRequest {
        model: model.to_string(),
        messages: prompts::general_inquiry(message, &product.profile.inquiry_categories()),
        schema: ResponseSchema::of::<InquiryAnswer>(SCHEMA_NAME),
    };

    match complete_as::<InquiryAnswer>(client, request).await {
        Ok(answer) => StepOutcome::completed(answer.resolve(product)),
        Err(error) => {
            warn!(
                event_name = "triage.general_inquiry.fallback",
                product = product.name,
                error_kind = error.kind(),
                error = %error,
                "inquiry extraction failed; routing to human review"
            );
            StepOutcome::degraded(InquiryAnswer::fallback().resolve(product), error)
        }
    }
}
