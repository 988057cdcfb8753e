use schemars::JsonSchema;
use serde::Deserialize;
use supportdesk_core::domain::classification::{normalize_confidence, Classification};
use tracing::warn;

use crate::llm::{complete_as, CompletionClient, CompletionError, CompletionRequest, ResponseSchema};
use crate::prompts;
use crate::steps::{null_as_default, StepOutcome};

pub const SCHEMA_NAME: &str = "classification";

#[derive(Clone, Debug, Deserialize, JsonSchema)]
pub struct ClassificationAnswer {
    /// One of `bug_report`, `feature_request`, `general_inquiry`.
    pub classification: String,
    /// Confidence in `[0, 1]`.
    #[serde(default, deserialize_with = "null_as_default")]
    #[schemars(with = "f64")]
    pub confidence_score: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClassificationVerdict {
    pub classification: Classification,
    pub confidence_score: f64,
}

impl ClassificationVerdict {
    /// Fail-open verdict used whenever the backend cannot produce a usable answer.
    pub fn fallback() -> Self {
        Self { classification: Classification::GeneralInquiry, confidence_score: 0.0 }
    }
}

impl TryFrom<ClassificationAnswer> for ClassificationVerdict {
    type Error = CompletionError;

    fn try_from(answer: ClassificationAnswer) -> Result<Self, Self::Error> {
        let classification = Classification::from_label(&answer.classification).ok_or_else(|| {
            CompletionError::Schema(format!(
                "unrecognised classification label `{}`",
                answer.classification
            ))
        })?;
        Ok(Self { classification, confidence_score: normalize_confidence(answer.confidence_score) })
    }
}

pub async fn classify(
    client: &dyn CompletionClient,
    model: &str,
    message: &str,
) -> StepOutcome<ClassificationVerdict> {
    let request = CompletionRequest {
        model: model.to_string(),
        messages: prompts::classification(message),
        schema: ResponseSchema::of::<ClassificationAnswer>(SCHEMA_NAME),
    };

    let verdict = complete_as::<ClassificationAnswer>(client, request)
        .await
        .and_then(ClassificationVerdict::try_from);

    match verdict {
        Ok(verdict) => StepOutcome::completed(verdict),
        Err(error) => {
            warn!(
                event_name = "triage.classification.fallback",
                error_kind = error.kind(),
                error = %error,
                "classification failed; defaulting to general_inquiry"
            );
            StepOutcome::degraded(ClassificationVerdict::fallback(), error)
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use supportdesk_core::domain::classification::Classification;

    use super::{classify, ClassificationVerdict, SCHEMA_NAME};
    use crate::llm::{CompletionError, ScriptedCompletionClient};

    #[tokio::test]
    async fn recognised_label_is_returned_with_its_confidence() {
        let client = ScriptedCompletionClient::new().with_reply(
            SCHEMA_NAME,
            json!({ "classification": "bug_report", "confidence_score": 0.99 }),
        );

        let outcome = classify(&client, "gpt-4o-mini", "I can't log in").await;

        assert!(!outcome.is_degraded());
        assert_eq!(outcome.value.classification, Classification::BugReport);
        assert_eq!(outcome.value.confidence_score, 0.99);
        let calls = client.calls();
        assert_eq!(calls[0].model, "gpt-4o-mini");
        assert!(calls[0].messages[1].content.contains("I can't log in"));
    }

    #[tokio::test]
    async fn out_of_range_confidence_is_clamped() {
        let client = ScriptedCompletionClient::new().with_reply(
            SCHEMA_NAME,
            json!({ "classification": "Feature_Request", "confidence_score": 7.5 }),
        );

        let outcome = classify(&client, "m", "add dark mode").await;

        assert_eq!(outcome.value.classification, Classification::FeatureRequest);
        assert_eq!(outcome.value.confidence_score, 1.0);
    }

    #[tokio::test]
    async fn backend_failure_fails_open_to_general_inquiry() {
        let client = ScriptedCompletionClient::new().with_failure(
            SCHEMA_NAME,
            CompletionError::BackendUnavailable("connection refused".to_string()),
        );

        let outcome = classify(&client, "m", "hello").await;

        assert_eq!(outcome.value, ClassificationVerdict::fallback());
        assert!(matches!(outcome.fallback, Some(CompletionError::BackendUnavailable(_))));
    }

    #[tokio::test]
    async fn unrecognised_label_is_treated_as_schema_failure() {
        let client = ScriptedCompletionClient::new().with_reply(
            SCHEMA_NAME,
            json!({ "classification": "complaint", "confidence_score": 0.8 }),
        );

        let outcome = classify(&client, "m", "you are terrible").await;

        assert_eq!(outcome.value.classification, Classification::GeneralInquiry);
        assert_eq!(outcome.value.confidence_score, 0.0);
        assert!(matches!(outcome.fallback, Some(CompletionError::Schema(_))));
    }

    #[tokio::test]
    async fn null_confidence_keeps_the_label() {
        let client = ScriptedCompletionClient::new().with_reply(
            SCHEMA_NAME,
            json!({ "classification": "bug_report", "confidence_score": null }),
        );

        let outcome = classify(&client, "m", "the app crashes").await;

        assert!(!outcome.is_degraded());
        assert_eq!(outcome.value.classification, Classification::BugReport);
        assert_eq!(outcome.value.confidence_score, 0.0);
    }
}
