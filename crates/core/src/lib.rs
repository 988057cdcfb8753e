pub mod audit;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;
pub mod flows;

pub use audit::{
    AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink, InMemoryAuditSink,
    TracingAuditSink,
};
pub use catalog::{CatalogError, ProductCatalog, ProductProfile, ProductRef};
pub use domain::classification::Classification;
pub use domain::records::{
    BugTicket, BusinessValue, FeatureRequestDraft, InquiryRecord, ProductRequirement,
    ResponseData, OTHER_CATEGORY, UNKNOWN_VALUE,
};
pub use domain::state::{CustomerMessage, ProcessedMessage, WorkflowState};
pub use domain::ticket::{AtomicTicketSequence, TicketId, TicketKind, TicketSequence};
pub use errors::{ApplicationError, DomainError, InterfaceError};
