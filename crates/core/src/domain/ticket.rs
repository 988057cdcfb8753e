use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(pub String);

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TicketKind {
    Bug,
    FeatureRequest,
}

impl TicketKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Bug => "BUG",
            Self::FeatureRequest => "FR",
        }
    }

    pub fn format(&self, sequence: u64) -> TicketId {
        TicketId(format!("{}-{sequence}", self.prefix()))
    }
}

/// Issues ticket identifiers. Implementations must hand out distinct ids per kind even
/// when called from many requests at once.
pub trait TicketSequence: Send + Sync {
    fn next_id(&self, kind: TicketKind) -> TicketId;
}

/// Process-scoped sequence backed by one atomic counter per ticket kind. Ids restart at
/// the configured value on every process start.
#[derive(Debug)]
pub struct AtomicTicketSequence {
    bug: AtomicU64,
    feature_request: AtomicU64,
}

impl AtomicTicketSequence {
    pub fn new() -> Self {
        Self::starting_at(1, 1)
    }

    pub fn starting_at(bug: u64, feature_request: u64) -> Self {
        Self { bug: AtomicU64::new(bug), feature_request: AtomicU64::new(feature_request) }
    }

    fn counter(&self, kind: TicketKind) -> &AtomicU64 {
        match kind {
            TicketKind::Bug => &self.bug,
            TicketKind::FeatureRequest => &self.feature_request,
        }
    }
}

impl Default for AtomicTicketSequence {
    fn default() -> Self {
        Self::new()
    }
}

impl TicketSequence for AtomicTicketSequence {
    fn next_id(&self, kind: TicketKind) -> TicketId {
        let value = self.counter(kind).fetch_add(1, Ordering::Relaxed);
        kind.format(value)
    }
}
