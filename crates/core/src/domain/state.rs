use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::classification::{normalize_confidence, Classification};
use crate::domain::records::ResponseData;
use crate::errors::DomainError;

pub const INVALID_PRODUCT_RESPONSE: &str = "Invalid Product Name";

/// Inbound request: one customer message about one product.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerMessage {
    pub customer_id: String,
    pub message: String,
    pub product: String,
}

/// Record threaded through one pipeline run.
///
/// Created per request with the caller's fields, then written exactly twice: once by the
/// classification step and once by the extraction step the router selected. A second
/// write to either stage is rejected instead of silently overwriting the first.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowState {
    pub customer_id: Option<String>,
    pub message: Option<String>,
    pub product: Option<String>,
    classification: Option<Classification>,
    confidence_score: Option<f64>,
    pub extraction_data: Option<Map<String, Value>>,
    customer_response: Option<String>,
    response_data: Option<ResponseData>,
}

impl WorkflowState {
    pub fn new(input: CustomerMessage) -> Self {
        Self {
            customer_id: Some(input.customer_id),
            message: Some(input.message),
            product: Some(input.product),
            ..Self::default()
        }
    }

    pub fn message_text(&self) -> &str {
        self.message.as_deref().unwrap_or_default()
    }

    pub fn product_name(&self) -> &str {
        self.product.as_deref().unwrap_or_default()
    }

    pub fn classification(&self) -> Option<Classification> {
        self.classification
    }

    pub fn confidence_score(&self) -> Option<f64> {
        self.confidence_score
    }

    pub fn customer_response(&self) -> Option<&str> {
        self.customer_response.as_deref()
    }

    pub fn response_data(&self) -> Option<&ResponseData> {
        self.response_data.as_ref()
    }

    pub fn is_classified(&self) -> bool {
        self.classification.is_some()
    }

    pub fn is_complete(&self) -> bool {
        self.customer_response.is_some() && self.response_data.is_some()
    }

    pub fn record_classification(
        &mut self,
        classification: Classification,
        confidence_score: f64,
    ) -> Result<(), DomainError> {
        if self.classification.is_some() || self.confidence_score.is_some() {
            return Err(DomainError::FieldAlreadySet { field: "classification" });
        }
        self.classification = Some(classification);
        self.confidence_score = Some(normalize_confidence(confidence_score));
        Ok(())
    }

    pub fn record_extraction(
        &mut self,
        customer_response: String,
        response_data: ResponseData,
    ) -> Result<(), DomainError> {
        if self.customer_response.is_some() || self.response_data.is_some() {
            return Err(DomainError::FieldAlreadySet { field: "customer_response" });
        }
        self.customer_response = Some(customer_response);
        self.response_data = Some(response_data);
        Ok(())
    }

    pub fn into_processed(self) -> ProcessedMessage {
        ProcessedMessage {
            message_type: self.classification.map(|c| c.as_str().to_string()).unwrap_or_default(),
            confidence_score: self.confidence_score.unwrap_or(0.0),
            response_data: self.response_data.unwrap_or_default(),
            customer_response: self.customer_response.unwrap_or_default(),
        }
    }
}

/// Outbound result of processing one customer message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProcessedMessage {
    pub message_type: String,
    pub confidence_score: f64,
    pub response_data: ResponseData,
    pub customer_response: String,
}

impl ProcessedMessage {
    pub fn invalid_product() -> Self {
        Self {
            message_type: String::new(),
            confidence_score: 0.0,
            response_data: ResponseData::empty(),
            customer_response: INVALID_PRODUCT_RESPONSE.to_string(),
        }
    }

    pub fn classification(&self) -> Option<Classification> {
        Classification::from_label(&self.message_type)
    }
}
