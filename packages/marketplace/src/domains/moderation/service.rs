//! Remote-call wrapper for one moderated domain.
//!
//! Each operation is exactly one zome call (three for `list_by_status`). Any
//! failure, including a dropped connection, is returned as a [`ServiceError`]
//! naming the domain and the operation. Nothing here retries or caches.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::sync::Arc;

use super::domain::Domain;
use super::models::{EntryInput, UpdateEntryInput};
use crate::common::{
    ActionHash, Operation, Record, RemoteError, ServiceError, Status, StatusChange,
    StatusPartitions,
};
use crate::kernel::{BaseRemoteRuntime, ZomeFunctions};

pub struct EntityService<D: Domain> {
    runtime: Arc<dyn BaseRemoteRuntime>,
    functions: ZomeFunctions,
    _domain: PhantomData<fn() -> D>,
}

impl<D: Domain> EntityService<D> {
    pub fn new(runtime: Arc<dyn BaseRemoteRuntime>) -> Self {
        Self::with_functions(runtime, D::functions())
    }

    /// Use non-default remote function names.
    pub fn with_functions(runtime: Arc<dyn BaseRemoteRuntime>, functions: ZomeFunctions) -> Self {
        Self {
            runtime,
            functions,
            _domain: PhantomData,
        }
    }

    pub fn functions(&self) -> &ZomeFunctions {
        &self.functions
    }

    pub fn is_connected(&self) -> bool {
        self.runtime.is_connected()
    }

    async fn call<I, T>(&self, operation: Operation, fn_name: &str, payload: &I) -> Result<T, ServiceError>
    where
        I: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let fail = |source: RemoteError| {
            tracing::warn!(
                domain = D::NAME,
                zome = D::ZOME,
                fn_name,
                error = %source,
                "Remote call failed"
            );
            ServiceError::new(D::NAME, operation, source)
        };

        let payload =
            serde_json::to_value(payload).map_err(|e| fail(RemoteError::Serialize(e.to_string())))?;

        tracing::debug!(domain = D::NAME, zome = D::ZOME, fn_name, "Calling remote function");

        let value = self
            .runtime
            .call_zome(D::ZOME, fn_name, payload)
            .await
            .map_err(&fail)?;

        serde_json::from_value(value).map_err(|e| fail(RemoteError::Decode(e.to_string())))
    }

    /// Create an entity as an administrator. It lands in the approved partition.
    pub async fn create(&self, entry: &D::Entry) -> Result<Record<D::Entry>, ServiceError> {
        self.call(Operation::Create, &self.functions.create, &EntryInput { entry })
            .await
    }

    /// Propose an entity for moderation. It lands in the pending partition.
    pub async fn suggest(&self, entry: &D::Entry) -> Result<Record<D::Entry>, ServiceError> {
        self.call(Operation::Suggest, &self.functions.suggest, &EntryInput { entry })
            .await
    }

    /// Fetch the record stored at exactly `hash`.
    pub async fn get(&self, hash: &ActionHash) -> Result<Option<Record<D::Entry>>, ServiceError> {
        self.call(Operation::Get, &self.functions.get, hash).await
    }

    /// Fetch the most recent revision of the entity created at `original`.
    pub async fn get_latest(
        &self,
        original: &ActionHash,
    ) -> Result<Option<Record<D::Entry>>, ServiceError> {
        self.call(Operation::GetLatest, &self.functions.get_latest, original)
            .await
    }

    pub async fn update(
        &self,
        original: &ActionHash,
        previous: &ActionHash,
        updated: &D::Entry,
    ) -> Result<Record<D::Entry>, ServiceError> {
        let input = UpdateEntryInput {
            original_action_hash: *original,
            previous_action_hash: *previous,
            updated_entry: updated,
        };
        self.call(Operation::Update, &self.functions.update, &input)
            .await
    }

    pub async fn delete(&self, original: &ActionHash) -> Result<(), ServiceError> {
        self.call(Operation::Delete, &self.functions.delete, original)
            .await
    }

    pub async fn list(&self, status: Status) -> Result<Vec<Record<D::Entry>>, ServiceError> {
        self.call(Operation::List(status), self.functions.list(status), &())
            .await
    }

    /// All three partitions, fetched concurrently.
    ///
    /// Fails as a whole if any of the three calls fails.
    pub async fn list_by_status(&self) -> Result<StatusPartitions<Record<D::Entry>>, ServiceError> {
        let (pending, approved, rejected) = tokio::try_join!(
            self.list(Status::Pending),
            self.list(Status::Approved),
            self.list(Status::Rejected),
        )?;
        Ok(StatusPartitions {
            pending,
            approved,
            rejected,
        })
    }

    pub async fn approve(&self, original: &ActionHash) -> Result<(), ServiceError> {
        self.call(Operation::Approve, &self.functions.approve, original)
            .await
    }

    pub async fn reject(&self, original: &ActionHash) -> Result<(), ServiceError> {
        self.call(Operation::Reject, &self.functions.reject, original)
            .await
    }

    /// Status changes in the order they were recorded.
    pub async fn status_history(&self, original: &ActionHash) -> Result<Vec<StatusChange>, ServiceError> {
        self.call(Operation::StatusHistory, &self.functions.status_history, original)
            .await
    }
}

impl<D: Domain> Clone for EntityService<D> {
    fn clone(&self) -> Self {
        Self {
            runtime: self.runtime.clone(),
            functions: self.functions.clone(),
            _domain: PhantomData,
        }
    }
}

impl<D: Domain> std::fmt::Debug for EntityService<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityService")
            .field("domain", &D::NAME)
            .field("zome", &D::ZOME)
            .finish_non_exhaustive()
    }
}
