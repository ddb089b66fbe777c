use std::time::Duration;
use thiserror::Error;

use super::hash::ActionHash;
use super::types::Status;

/// Transport-level failures reported by the remote runtime
///
/// Messages are kept as strings so the error stays `Clone` and can be
/// stored on a store's error field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    #[error("Not connected to the remote runtime")]
    NotConnected,

    #[error("Timeout error: {0}")]
    Timeout(String),

    #[error("Error while calling the {fn_name} function of the {zome} zome: {message}")]
    Call {
        zome: String,
        fn_name: String,
        message: String,
    },

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("Invalid entry data: {0}")]
    InvalidEntry(String),

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("Deserialization error: {0}")]
    Decode(String),
}

/// Coarse failure category, by call site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Creation,
    Retrieval,
    Update,
    Deletion,
    StatusTransition,
    Connection,
}

/// The service operation an error originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Suggest,
    Get,
    GetLatest,
    Update,
    Delete,
    List(Status),
    Approve,
    Reject,
    StatusHistory,
}

impl Operation {
    pub fn kind(&self) -> FailureKind {
        match self {
            Operation::Create | Operation::Suggest => FailureKind::Creation,
            Operation::Get | Operation::GetLatest | Operation::List(_) | Operation::StatusHistory => {
                FailureKind::Retrieval
            }
            Operation::Update => FailureKind::Update,
            Operation::Delete => FailureKind::Deletion,
            Operation::Approve | Operation::Reject => FailureKind::StatusTransition,
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Create => f.write_str("create"),
            Operation::Suggest => f.write_str("suggest"),
            Operation::Get => f.write_str("get"),
            Operation::GetLatest => f.write_str("get latest revision"),
            Operation::Update => f.write_str("update"),
            Operation::Delete => f.write_str("delete"),
            Operation::List(status) => write!(f, "list {}", status),
            Operation::Approve => f.write_str("approve"),
            Operation::Reject => f.write_str("reject"),
            Operation::StatusHistory => f.write_str("get status history"),
        }
    }
}

/// A remote failure tagged with the domain and operation that hit it
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{domain}: failed to {operation}: {source}")]
pub struct ServiceError {
    pub domain: &'static str,
    pub operation: Operation,
    #[source]
    pub source: RemoteError,
}

impl ServiceError {
    pub fn new(domain: &'static str, operation: Operation, source: RemoteError) -> Self {
        Self {
            domain,
            operation,
            source,
        }
    }

    /// Connection problems win over the operation's own category.
    pub fn kind(&self) -> FailureKind {
        match self.source {
            RemoteError::NotConnected => FailureKind::Connection,
            _ => self.operation.kind(),
        }
    }
}

/// Errors surfaced by an entity store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("{domain}: invalid entry: {message}")]
    Validation {
        domain: &'static str,
        message: String,
    },

    #[error("{domain}: status transition from {from} to {to} is not allowed")]
    TransitionDenied {
        domain: &'static str,
        from: Status,
        to: Status,
    },

    #[error("{domain}: entity {original} not found")]
    NotFound {
        domain: &'static str,
        original: ActionHash,
    },

    #[error("{domain}: entity {original} not visible after {attempts} attempts ({waited:?})")]
    NotVisible {
        domain: &'static str,
        original: ActionHash,
        attempts: u32,
        waited: Duration,
    },
}

impl StoreError {
    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            StoreError::Service(err) => Some(err.kind()),
            _ => None,
        }
    }
}
