//! Status transition policy.
//!
//! The remote runtime accepts any status change from an administrator, so
//! the default policy is unrestricted. A strict table can be configured to
//! reject transitions locally, before the remote call is issued.

use std::collections::HashSet;

use crate::common::Status;

/// Explicit set of allowed `(from, to)` pairs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionTable {
    allowed: HashSet<(Status, Status)>,
}

impl TransitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow(mut self, from: Status, to: Status) -> Self {
        self.allowed.insert((from, to));
        self
    }

    /// pending → approved | rejected, rejected → approved, approved → rejected.
    pub fn moderation() -> Self {
        Self::new()
            .allow(Status::Pending, Status::Approved)
            .allow(Status::Pending, Status::Rejected)
            .allow(Status::Rejected, Status::Approved)
            .allow(Status::Approved, Status::Rejected)
    }

    pub fn is_allowed(&self, from: Status, to: Status) -> bool {
        self.allowed.contains(&(from, to))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TransitionPolicy {
    #[default]
    Unrestricted,
    Strict(TransitionTable),
}

impl TransitionPolicy {
    pub fn strict() -> Self {
        TransitionPolicy::Strict(TransitionTable::moderation())
    }

    /// Checks a transition. An unknown current status always passes: the
    /// store does not track the entity, so the remote runtime decides.
    pub fn permits(&self, from: Option<Status>, to: Status) -> bool {
        match (self, from) {
            (TransitionPolicy::Unrestricted, _) => true,
            (TransitionPolicy::Strict(_), None) => true,
            (TransitionPolicy::Strict(table), Some(from)) => table.is_allowed(from, to),
        }
    }
}
