use thiserror::Error;

use crate::flows::FlowTransitionError;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("workflow field `{field}` was already set")]
    FieldAlreadySet { field: &'static str },
    #[error(transparent)]
    FlowTransition(#[from] FlowTransitionError),
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => {
                "The request could not be processed. Check inputs and try again."
            }
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. } | Self::Internal { correlation_id, .. } => {
                correlation_id
            }
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        match value {
            // Workflow invariants never depend on caller input.
            ApplicationError::Domain(error) => {
                Self::Internal { message: error.to_string(), correlation_id: "unassigned".to_owned() }
            }
            ApplicationError::InvalidRequest(message) => {
                Self::BadRequest { message, correlation_id: "unassigned".to_owned() }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::{ApplicationError, DomainError, InterfaceError};
    use crate::flows::{FlowEvent, FlowState, FlowTransitionError};

    #[test]
    fn domain_error_maps_to_internal_interface_error() {
        let interface = ApplicationError::from(DomainError::FieldAlreadySet {
            field: "classification",
        })
        .into_interface("req-1");

        assert!(matches!(
            interface,
            InterfaceError::Internal {
                ref correlation_id,
                ..
            } if correlation_id == "req-1"
        ));
        assert_eq!(interface.correlation_id(), "req-1");
    }

    #[test]
    fn flow_transition_errors_convert_into_domain_errors() {
        let error = DomainError::from(FlowTransitionError::InvalidTransition {
            state: FlowState::Terminal,
            event: FlowEvent::ClassificationCompleted,
        });

        assert!(matches!(error, DomainError::FlowTransition(_)));
        assert!(error.to_string().contains("Terminal"));
    }

    #[test]
    fn invalid_request_maps_to_bad_request_with_user_safe_message() {
        let interface = ApplicationError::InvalidRequest("missing field `product`".to_owned())
            .into_interface("req-3");

        assert!(matches!(
            interface,
            InterfaceError::BadRequest { ref message, .. } if message.contains("product")
        ));
        assert_eq!(interface.correlation_id(), "req-3");
        assert_eq!(
            interface.user_message(),
            "The request could not be processed. Check inputs and try again."
        );
    }
}
