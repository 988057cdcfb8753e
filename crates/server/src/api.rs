//! Customer-message API.
//!
//! - `POST /process-customer-message` runs one message through the triage pipeline
//! - `GET  /api/v1/products`          lists the configured products
//!
//! Every response carries the request's correlation id in `x-correlation-id`.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use supportdesk_agent::TriageRuntime;
use supportdesk_core::domain::state::{CustomerMessage, ProcessedMessage};
use supportdesk_core::errors::{ApplicationError, InterfaceError};
use tracing::{error, info, warn};
use uuid::Uuid;

pub const CORRELATION_HEADER: &str = "x-correlation-id";

#[derive(Clone)]
pub struct ApiState {
    runtime: TriageRuntime,
}

#[derive(Debug, Deserialize)]
pub struct ProcessMessageRequest {
    pub customer_id: String,
    pub message: String,
    pub product: String,
}

impl From<ProcessMessageRequest> for CustomerMessage {
    fn from(request: ProcessMessageRequest) -> Self {
        Self { customer_id: request.customer_id, message: request.message, product: request.product }
    }
}

#[derive(Debug, Serialize)]
pub struct ProductSummary {
    pub name: String,
    pub description: String,
    pub components: Vec<String>,
    pub inquiry_categories: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ProductsResponse {
    pub products: Vec<ProductSummary>,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub error: String,
    pub correlation_id: String,
}

/// Interface error rendered as a JSON body with the matching status code.
#[derive(Debug)]
pub struct ApiError(pub InterfaceError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let correlation_id = self.0.correlation_id().to_string();
        let body = ApiErrorBody {
            error: self.0.user_message().to_string(),
            correlation_id: correlation_id.clone(),
        };
        (status, correlation_headers(&correlation_id), Json(body)).into_response()
    }
}

pub fn router(runtime: TriageRuntime) -> Router {
    Router::new()
        .route("/process-customer-message", post(process_customer_message))
        .route("/api/v1/products", get(list_products))
        .with_state(ApiState { runtime })
}

pub async fn process_customer_message(
    State(state): State<ApiState>,
    payload: Result<Json<ProcessMessageRequest>, JsonRejection>,
) -> Result<(HeaderMap, Json<ProcessedMessage>), ApiError> {
    let correlation_id = Uuid::new_v4().to_string();
    let Json(request) = payload.map_err(|rejection| {
        warn!(
            event_name = "api.message.rejected",
            correlation_id = %correlation_id,
            reason = %rejection.body_text(),
            "customer message body rejected"
        );
        let error = ApplicationError::InvalidRequest(rejection.body_text());
        ApiError(error.into_interface(&correlation_id))
    })?;
    info!(
        event_name = "api.message.received",
        correlation_id = %correlation_id,
        product = %request.product,
        "customer message received"
    );

    match state.runtime.process(request.into(), &correlation_id).await {
        Ok(processed) => Ok((correlation_headers(&correlation_id), Json(processed))),
        Err(application_error) => {
            error!(
                event_name = "api.message.failed",
                correlation_id = %correlation_id,
                error = %application_error,
                "customer message processing failed"
            );
            Err(ApiError(application_error.into_interface(correlation_id)))
        }
    }
}

pub async fn list_products(State(state): State<ApiState>) -> Json<ProductsResponse> {
    let products = state
        .runtime
        .catalog()
        .products()
        .map(|product| ProductSummary {
            name: product.name.to_string(),
            description: product.profile.description.clone(),
            components: product.profile.component_names().into_iter().map(str::to_string).collect(),
            inquiry_categories: product
                .profile
                .inquiry_categories()
                .into_iter()
                .map(str::to_string)
                .collect(),
        })
        .collect();

    Json(ProductsResponse { products })
}

fn correlation_headers(correlation_id: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(correlation_id) {
        headers.insert(CORRELATION_HEADER, value);
    }
    headers
}
