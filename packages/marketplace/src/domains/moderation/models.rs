use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{ActionHash, AgentPubKey, EntityHashes, Record, Status, StatusPartitions};

/// Payload for create/suggest calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryInput<E> {
    pub entry: E,
}

/// Payload for update calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateEntryInput<E> {
    pub original_action_hash: ActionHash,
    pub previous_action_hash: ActionHash,
    pub updated_entry: E,
}

/// UI-facing entity: a decoded record plus its identifiers and status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiEntity<E> {
    pub hashes: EntityHashes,
    pub entry: E,
    pub creator: AgentPubKey,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub status: Status,
}

impl<E> UiEntity<E> {
    /// Build from a remote record.
    ///
    /// For an update record the creation time is not known here; callers that
    /// track the entity should keep their own `created_at` and `creator`.
    pub fn from_record(record: Record<E>, status: Status) -> Self {
        let hashes = record.hashes();
        let updated_at = (!record.is_original()).then_some(record.timestamp);
        Self {
            hashes,
            entry: record.entry,
            creator: record.author,
            created_at: record.timestamp,
            updated_at,
            status,
        }
    }

    pub fn original(&self) -> ActionHash {
        self.hashes.original
    }

    pub fn latest(&self) -> ActionHash {
        self.hashes.latest
    }
}

/// Point-in-time view of a store's partitions, published after every mutation
pub type StoreSnapshot<E> = StatusPartitions<UiEntity<E>>;
