use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::hash::{ActionHash, AgentPubKey};

/// Moderation status of an entity
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Pending,
    Approved,
    Rejected,
}

impl Status {
    /// Every status, in partition order.
    pub const ALL: [Status; 3] = [Status::Pending, Status::Approved, Status::Rejected];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Approved => "approved",
            Status::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Status {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "pending" => Ok(Status::Pending),
            "approved" => Ok(Status::Approved),
            "rejected" => Ok(Status::Rejected),
            _ => Err(anyhow::anyhow!("Invalid status: {}", s)),
        }
    }
}

/// Three collections, one per [`Status`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusPartitions<T> {
    pub pending: Vec<T>,
    pub approved: Vec<T>,
    pub rejected: Vec<T>,
}

impl<T> Default for StatusPartitions<T> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
            approved: Vec::new(),
            rejected: Vec::new(),
        }
    }
}

impl<T> StatusPartitions<T> {
    pub fn get(&self, status: Status) -> &Vec<T> {
        match status {
            Status::Pending => &self.pending,
            Status::Approved => &self.approved,
            Status::Rejected => &self.rejected,
        }
    }

    pub fn get_mut(&mut self, status: Status) -> &mut Vec<T> {
        match status {
            Status::Pending => &mut self.pending,
            Status::Approved => &mut self.approved,
            Status::Rejected => &mut self.rejected,
        }
    }

    /// Iterates every item with the status of the partition holding it.
    pub fn iter(&self) -> impl Iterator<Item = (Status, &T)> {
        Status::ALL
            .into_iter()
            .flat_map(move |status| self.get(status).iter().map(move |item| (status, item)))
    }

    /// Total number of items across all partitions.
    pub fn len(&self) -> usize {
        self.pending.len() + self.approved.len() + self.rejected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Transforms every item, keeping it in the same partition.
    pub fn map<U, F>(self, mut f: F) -> StatusPartitions<U>
    where
        F: FnMut(Status, T) -> U,
    {
        StatusPartitions {
            pending: self.pending.into_iter().map(|t| f(Status::Pending, t)).collect(),
            approved: self.approved.into_iter().map(|t| f(Status::Approved, t)).collect(),
            rejected: self.rejected.into_iter().map(|t| f(Status::Rejected, t)).collect(),
        }
    }
}

/// The identifier pair of an entity
///
/// `original` is assigned at creation and never changes. `latest` points at
/// the most recent accepted revision (equal to `original` until the first edit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityHashes {
    pub original: ActionHash,
    pub latest: ActionHash,
}

/// A record as returned by the remote runtime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record<E> {
    /// Hash of this action (a create or an update).
    pub action_hash: ActionHash,
    /// Hash of the create action at the root of the update chain.
    pub original_action_hash: ActionHash,
    pub author: AgentPubKey,
    pub timestamp: DateTime<Utc>,
    pub entry: E,
}

impl<E> Record<E> {
    pub fn hashes(&self) -> EntityHashes {
        EntityHashes {
            original: self.original_action_hash,
            latest: self.action_hash,
        }
    }

    /// `true` for the create action, `false` for an update.
    pub fn is_original(&self) -> bool {
        self.action_hash == self.original_action_hash
    }
}

/// One entry of an entity's append-only status history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub status: Status,
    pub changed_by: AgentPubKey,
    pub changed_at: DateTime<Utc>,
}
