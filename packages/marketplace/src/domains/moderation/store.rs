//! Reactive entity store.
//!
//! Owns the in-process view of one domain: three status partitions, a TTL
//! cache keyed by original action hash, a loading flag and an error field.
//! Every mutation goes through the [`EntityService`]; local state changes
//! only after the remote call succeeds, so a failed operation leaves the
//! partitions exactly as they were.

use std::collections::HashSet;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tokio::sync::watch;
use typed_builder::TypedBuilder;

use super::cache::EntityCache;
use super::confirm::{self, ConfirmError, ConfirmOptions};
use super::domain::Domain;
use super::events::DomainEvents;
use super::models::{StoreSnapshot, UiEntity};
use super::service::EntityService;
use super::transitions::TransitionPolicy;
use crate::common::{ActionHash, Record, Status, StatusChange, StatusPartitions, StoreError};
use crate::kernel::BaseRemoteRuntime;

pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, TypedBuilder)]
pub struct StoreOptions {
    #[builder(default = Duration::from_secs(DEFAULT_CACHE_TTL_SECS))]
    pub cache_ttl: Duration,
    #[builder(default)]
    pub policy: TransitionPolicy,
    #[builder(default)]
    pub confirm: ConfirmOptions,
    #[builder(default = DEFAULT_EVENT_CAPACITY)]
    pub event_capacity: usize,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

struct StoreState<E> {
    partitions: StatusPartitions<UiEntity<E>>,
    cache: EntityCache<UiEntity<E>>,
    error: Option<StoreError>,
}

impl<E: Clone> StoreState<E> {
    fn find(&self, original: &ActionHash) -> Option<&UiEntity<E>> {
        self.partitions
            .iter()
            .map(|(_, entity)| entity)
            .find(|entity| entity.original() == *original)
    }

    /// Remove `original` from every partition, returning the last copy found.
    fn take(&mut self, original: &ActionHash) -> Option<UiEntity<E>> {
        let mut removed = None;
        for status in Status::ALL {
            let partition = self.partitions.get_mut(status);
            if let Some(index) = partition.iter().position(|e| e.original() == *original) {
                removed = Some(partition.remove(index));
            }
        }
        removed
    }

    /// Put `entity` in the partition of its status, dropping any other copy.
    fn place(&mut self, entity: UiEntity<E>) {
        self.take(&entity.original());
        self.partitions.get_mut(entity.status).push(entity);
    }

    /// Replace a tracked entity where it stands. Returns `false` if untracked.
    fn replace(&mut self, entity: UiEntity<E>) -> bool {
        let partition = self.partitions.get_mut(entity.status);
        match partition.iter().position(|e| e.original() == entity.original()) {
            Some(index) => {
                partition[index] = entity;
                true
            }
            None => false,
        }
    }
}

/// Keeps the in-flight counter raised for as long as it lives.
struct LoadingGuard {
    in_flight: Arc<AtomicUsize>,
}

impl LoadingGuard {
    fn enter(in_flight: &Arc<AtomicUsize>) -> Self {
        in_flight.fetch_add(1, Ordering::SeqCst);
        Self {
            in_flight: in_flight.clone(),
        }
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A newer revision of an entity the store already knows.
fn revise<E>(known: &UiEntity<E>, record: Record<E>) -> UiEntity<E> {
    let updated_at = (!record.is_original()).then_some(record.timestamp);
    UiEntity {
        hashes: record.hashes(),
        entry: record.entry,
        creator: known.creator,
        created_at: known.created_at,
        updated_at,
        status: known.status,
    }
}

pub struct EntityStore<D: Domain> {
    service: EntityService<D>,
    events: DomainEvents<D>,
    options: StoreOptions,
    state: RwLock<StoreState<D::Entry>>,
    in_flight: Arc<AtomicUsize>,
    snapshot_tx: watch::Sender<StoreSnapshot<D::Entry>>,
}

impl<D: Domain> EntityStore<D> {
    pub fn new(runtime: Arc<dyn BaseRemoteRuntime>, options: StoreOptions) -> Self {
        Self::with_service(EntityService::new(runtime), options)
    }

    pub fn with_service(service: EntityService<D>, options: StoreOptions) -> Self {
        let (snapshot_tx, _) = watch::channel(StoreSnapshot::default());
        Self {
            service,
            events: DomainEvents::new(options.event_capacity),
            state: RwLock::new(StoreState {
                partitions: StatusPartitions::default(),
                cache: EntityCache::new(options.cache_ttl),
                error: None,
            }),
            in_flight: Arc::new(AtomicUsize::new(0)),
            snapshot_tx,
            options,
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, StoreState<D::Entry>> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, StoreState<D::Entry>> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &StoreState<D::Entry>) {
        self.snapshot_tx.send_replace(state.partitions.clone());
    }

    /// Run `operation` with the loading flag raised, recording its error.
    async fn track<T, F>(&self, operation: &'static str, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        let _loading = LoadingGuard::enter(&self.in_flight);
        self.write_state().error = None;

        let result = fut.await;
        if let Err(e) = &result {
            tracing::warn!(domain = D::NAME, operation, error = %e, "Store operation failed");
            self.write_state().error = Some(e.clone());
        }
        result
    }

    fn validated(&self, entry: D::Entry) -> Result<D::Entry, StoreError> {
        let entry = D::prepare(entry);
        D::validate(&entry).map_err(|message| StoreError::Validation {
            domain: D::NAME,
            message,
        })?;
        Ok(entry)
    }

    /// Tracked copy from the partitions, falling back to a fresh cache entry.
    fn known(&self, original: &ActionHash) -> Option<UiEntity<D::Entry>> {
        let state = self.read_state();
        state
            .find(original)
            .or_else(|| state.cache.get(original))
            .cloned()
    }

    /// Build a UI entity for a record the store does not track, asking the
    /// remote runtime for its status and creation details.
    async fn describe(&self, record: Record<D::Entry>) -> Result<UiEntity<D::Entry>, StoreError> {
        let original = record.original_action_hash;
        let status = self
            .service
            .status_history(&original)
            .await?
            .last()
            .map(|change| change.status)
            .unwrap_or(Status::Pending);

        if record.is_original() {
            return Ok(UiEntity::from_record(record, status));
        }

        let mut entity = UiEntity::from_record(record, status);
        if let Some(created) = self.service.get(&original).await? {
            entity.creator = created.author;
            entity.created_at = created.timestamp;
        }
        Ok(entity)
    }

    async fn submit(&self, entry: D::Entry, status: Status) -> Result<UiEntity<D::Entry>, StoreError> {
        let operation = if status == Status::Approved { "create" } else { "suggest" };
        self.track(operation, async {
            let entry = self.validated(entry)?;
            tracing::info!(domain = D::NAME, label = %D::label(&entry), operation, "Submitting entity");

            let record = if status == Status::Approved {
                self.service.create(&entry).await?
            } else {
                self.service.suggest(&entry).await?
            };
            let entity = UiEntity::from_record(record, status);

            {
                let mut state = self.write_state();
                state.cache.insert(&entity.original(), entity.clone());
                state.place(entity.clone());
                self.publish(&state);
            }

            self.events.emit_created(entity.clone());
            Ok(entity)
        })
        .await
    }

    /// Create as an administrator; the entity starts out approved.
    pub async fn create(&self, entry: D::Entry) -> Result<UiEntity<D::Entry>, StoreError> {
        self.submit(entry, Status::Approved).await
    }

    /// Propose an entity; it waits in the pending partition for moderation.
    pub async fn suggest(&self, entry: D::Entry) -> Result<UiEntity<D::Entry>, StoreError> {
        self.submit(entry, Status::Pending).await
    }

    /// Cache-first read of the latest revision.
    pub async fn get(&self, original: &ActionHash) -> Result<Option<UiEntity<D::Entry>>, StoreError> {
        let cached = self.read_state().cache.get(original).cloned();
        if let Some(entity) = cached {
            tracing::debug!(domain = D::NAME, original = %original, "Cache hit");
            return Ok(Some(entity));
        }

        self.track("get", async {
            let Some(record) = self.service.get_latest(original).await? else {
                return Ok(None);
            };

            let tracked = self.read_state().find(original).cloned();
            let entity = match tracked {
                Some(known) => revise(&known, record),
                None => self.describe(record).await?,
            };

            self.write_state().cache.insert(original, entity.clone());
            Ok(Some(entity))
        })
        .await
    }

    /// Fetch all three partitions and replace the local ones.
    pub async fn get_all_by_status(&self) -> Result<StoreSnapshot<D::Entry>, StoreError> {
        self.track("get_all_by_status", async {
            let fetched = self.service.list_by_status().await?;

            // Later partitions win when the listing reports an entity twice.
            let mut winners = std::collections::HashMap::new();
            for (status, record) in fetched.iter() {
                winners.insert(record.original_action_hash, status);
            }

            let mut state = self.write_state();
            let mut seen = HashSet::new();
            let partitions = fetched.map(|status, record| {
                let known = state.find(&record.original_action_hash).cloned();
                match known {
                    Some(known) => UiEntity {
                        status,
                        ..revise(&known, record)
                    },
                    None => UiEntity::from_record(record, status),
                }
            });

            let mut merged = StatusPartitions::default();
            for status in Status::ALL {
                for entity in partitions.get(status).iter().rev() {
                    let original = entity.original();
                    if winners.get(&original) == Some(&status) && seen.insert(original) {
                        merged.get_mut(status).push(entity.clone());
                    }
                }
                merged.get_mut(status).reverse();
            }

            for (_, entity) in merged.iter() {
                state.cache.insert(&entity.original(), entity.clone());
            }
            state.partitions = merged;
            self.publish(&state);

            tracing::info!(
                domain = D::NAME,
                pending = state.partitions.pending.len(),
                approved = state.partitions.approved.len(),
                rejected = state.partitions.rejected.len(),
                "Loaded entities by status"
            );
            Ok(state.partitions.clone())
        })
        .await
    }

    /// Publish a new revision built on the latest one the store knows about.
    pub async fn update(
        &self,
        original: &ActionHash,
        entry: D::Entry,
    ) -> Result<UiEntity<D::Entry>, StoreError> {
        self.track("update", async {
            D::validate(&entry).map_err(|message| StoreError::Validation {
                domain: D::NAME,
                message,
            })?;

            let known = self.known(original);
            let previous = match &known {
                Some(entity) => entity.latest(),
                None => match self.service.get_latest(original).await? {
                    Some(record) => record.action_hash,
                    None => {
                        return Err(StoreError::NotFound {
                            domain: D::NAME,
                            original: *original,
                        })
                    }
                },
            };

            tracing::info!(domain = D::NAME, original = %original, previous = %previous, "Updating entity");
            let record = self.service.update(original, &previous, &entry).await?;
            let entity = match &known {
                Some(known) => revise(known, record),
                None => self.describe(record).await?,
            };

            {
                let mut state = self.write_state();
                state.cache.insert(original, entity.clone());
                if state.replace(entity.clone()) {
                    self.publish(&state);
                }
            }

            self.events.emit_updated(entity.clone());
            Ok(entity)
        })
        .await
    }

    pub async fn delete(&self, original: &ActionHash) -> Result<(), StoreError> {
        self.track("delete", async {
            tracing::info!(domain = D::NAME, original = %original, "Deleting entity");
            self.service.delete(original).await?;

            {
                let mut state = self.write_state();
                state.take(original);
                state.cache.remove(original);
                self.publish(&state);
            }

            self.events.emit_deleted(*original);
            Ok(())
        })
        .await
    }

    pub async fn approve(&self, original: &ActionHash) -> Result<(), StoreError> {
        self.transition(original, Status::Approved).await
    }

    pub async fn reject(&self, original: &ActionHash) -> Result<(), StoreError> {
        self.transition(original, Status::Rejected).await
    }

    async fn transition(&self, original: &ActionHash, to: Status) -> Result<(), StoreError> {
        let operation = if to == Status::Approved { "approve" } else { "reject" };
        self.track(operation, async {
            let from = self.status_of(original);
            if !self.options.policy.permits(from, to) {
                return Err(StoreError::TransitionDenied {
                    domain: D::NAME,
                    from: from.unwrap_or(to),
                    to,
                });
            }

            tracing::info!(domain = D::NAME, original = %original, ?from, %to, "Changing entity status");
            if to == Status::Approved {
                self.service.approve(original).await?;
            } else {
                self.service.reject(original).await?;
            }

            {
                let mut state = self.write_state();
                if let Some(mut entity) = state.take(original) {
                    entity.status = to;
                    state.partitions.get_mut(to).push(entity);
                }
                state.cache.update(original, |entity| entity.status = to);
                self.publish(&state);
            }

            self.events.emit_status_changed(*original, from, to);
            Ok(())
        })
        .await
    }

    /// Status changes, oldest first.
    pub async fn status_history(&self, original: &ActionHash) -> Result<Vec<StatusChange>, StoreError> {
        self.track("status_history", async {
            Ok(self.service.status_history(original).await?)
        })
        .await
    }

    /// Poll until the entity is readable through `get_latest`.
    ///
    /// Use before a write that depends on an earlier one, such as approving an
    /// entity that was suggested a moment ago.
    pub async fn wait_until_visible(&self, original: &ActionHash) -> Result<Record<D::Entry>, StoreError> {
        self.track("wait_until_visible", async {
            let service = &self.service;
            confirm::wait_for(self.options.confirm, move || service.get_latest(original))
                .await
                .map_err(|e| match e {
                    ConfirmError::TimedOut { attempts, waited } => StoreError::NotVisible {
                        domain: D::NAME,
                        original: *original,
                        attempts,
                        waited,
                    },
                    ConfirmError::Probe(e) => StoreError::Service(e),
                })
        })
        .await
    }

    /// Drop every cached entry. Partitions are untouched and nothing is refetched.
    pub fn invalidate_cache(&self) {
        self.write_state().cache.clear();
        tracing::debug!(domain = D::NAME, "Cache invalidated");
    }

    /// Every tracked entity: pending, then approved, then rejected.
    pub fn entities(&self) -> Vec<UiEntity<D::Entry>> {
        let state = self.read_state();
        let mut seen = HashSet::new();
        state
            .partitions
            .iter()
            .filter(|(_, entity)| seen.insert(entity.original()))
            .map(|(_, entity)| entity.clone())
            .collect()
    }

    pub fn pending(&self) -> Vec<UiEntity<D::Entry>> {
        self.read_state().partitions.pending.clone()
    }

    pub fn approved(&self) -> Vec<UiEntity<D::Entry>> {
        self.read_state().partitions.approved.clone()
    }

    pub fn rejected(&self) -> Vec<UiEntity<D::Entry>> {
        self.read_state().partitions.rejected.clone()
    }

    pub fn snapshot(&self) -> StoreSnapshot<D::Entry> {
        self.read_state().partitions.clone()
    }

    pub fn status_of(&self, original: &ActionHash) -> Option<Status> {
        self.known(original).map(|entity| entity.status)
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Error of the most recently failed operation, cleared when the next one starts.
    pub fn error(&self) -> Option<StoreError> {
        self.read_state().error.clone()
    }

    pub fn cache_len(&self) -> usize {
        self.read_state().cache.len()
    }

    pub fn subscribe_snapshot(&self) -> watch::Receiver<StoreSnapshot<D::Entry>> {
        self.snapshot_tx.subscribe()
    }

    pub fn events(&self) -> &DomainEvents<D> {
        &self.events
    }

    pub fn service(&self) -> &EntityService<D> {
        &self.service
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }
}

impl<D: Domain> std::fmt::Debug for EntityStore<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.read_state();
        f.debug_struct("EntityStore")
            .field("domain", &D::NAME)
            .field("pending", &state.partitions.pending.len())
            .field("approved", &state.partitions.approved.len())
            .field("rejected", &state.partitions.rejected.len())
            .field("cached", &state.cache.len())
            .field("loading", &self.is_loading())
            .finish()
    }
}
