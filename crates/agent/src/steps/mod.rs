//! Triage steps. Each step issues one structured completion and never propagates a backend
//! failure; it substitutes its fallback value and reports the failure in [`StepOutcome`].

pub mod bug_report;
pub mod classification;
pub mod feature_request;
pub mod general_inquiry;

use serde::{Deserialize, Deserializer};
use supportdesk_core::domain::records::UNKNOWN_VALUE;

use crate::llm::CompletionError;

#[derive(Clone, Debug, PartialEq)]
pub struct StepOutcome<T> {
    pub value: T,
    pub fallback: Option<CompletionError>,
}

impl<T> StepOutcome<T> {
    pub fn completed(value: T) -> Self {
        Self { value, fallback: None }
    }

    pub fn degraded(value: T, error: CompletionError) -> Self {
        Self { value, fallback: Some(error) }
    }

    pub fn is_degraded(&self) -> bool {
        self.fallback.is_some()
    }
}

pub(crate) fn unknown_value() -> String {
    UNKNOWN_VALUE.to_string()
}

/// Blank answers count as undeterminable.
pub(crate) fn or_unknown(value: String) -> String {
    if value.trim().is_empty() {
        unknown_value()
    } else {
        value.trim().to_string()
    }
}

/// Accepts a list, a single string, or null. Backends often answer a one-element list field
/// with a bare string such as `"UNKNOWN_VALUE"`.
pub(crate) fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::One(value)) => vec![value],
        Some(OneOrMany::Many(values)) => values,
        None => Vec::new(),
    })
}

/// Null counts as absent: the field takes `T::default()`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Null text is undeterminable, the same as a missing field.
pub(crate) fn text_or_unknown<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(unknown_value))
}

#[cfg(test)]
pub(crate) fn sample_catalog() -> supportdesk_core::catalog::ProductCatalog {
    supportdesk_core::catalog::ProductCatalog::from_json_str(
        r#"{
            "products": {
                "MobileApp": {
                    "description": "A mobile banking application for retail customers.",
                    "component_team_mapping": {
                        "Authentication Module": "Identity Team",
                        "Payments": "Payments Team"
                    },
                    "general_inquiry": {
                        "resource_dict": {
                            "Billing": ["https://help.example.com/billing"],
                            "Account Management": ["https://help.example.com/account"]
                        }
                    }
                }
            }
        }"#,
    )
    .expect("sample catalog parses")
}
