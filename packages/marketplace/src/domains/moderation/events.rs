//! Domain events for moderated entities.
//!
//! Events are facts about what already happened on the remote runtime. Each
//! store owns one [`DomainEvents`] bus; subscribers are called synchronously,
//! in emission order, after the store's own state has been updated.

use pubsub::{EventBus, Subscription};
use std::marker::PhantomData;
use tokio::sync::broadcast;

use super::domain::Domain;
use super::models::UiEntity;
use crate::common::{ActionHash, Status};

#[derive(Debug, Clone, PartialEq)]
pub enum EntityEvent<E> {
    Created {
        entity: UiEntity<E>,
    },
    Updated {
        entity: UiEntity<E>,
    },
    Deleted {
        original: ActionHash,
    },
    StatusChanged {
        original: ActionHash,
        /// `None` when the store was not tracking the entity.
        from: Option<Status>,
        to: Status,
    },
}

impl<E> EntityEvent<E> {
    pub fn original(&self) -> ActionHash {
        match self {
            EntityEvent::Created { entity } | EntityEvent::Updated { entity } => entity.original(),
            EntityEvent::Deleted { original } | EntityEvent::StatusChanged { original, .. } => {
                *original
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EntityEvent::Created { .. } => "created",
            EntityEvent::Updated { .. } => "updated",
            EntityEvent::Deleted { .. } => "deleted",
            EntityEvent::StatusChanged { .. } => "status_changed",
        }
    }
}

/// Typed event bus for one domain
pub struct DomainEvents<D: Domain> {
    bus: EventBus<EntityEvent<D::Entry>>,
    _domain: PhantomData<fn() -> D>,
}

impl<D: Domain> DomainEvents<D> {
    pub fn new(capacity: usize) -> Self {
        Self {
            bus: EventBus::with_capacity(capacity),
            _domain: PhantomData,
        }
    }

    fn emit(&self, event: EntityEvent<D::Entry>) -> usize {
        let event_name = event.name();
        let original = event.original();
        let reached = self.bus.emit(event);
        tracing::debug!(
            domain = D::NAME,
            event = event_name,
            original = %original,
            reached,
            "Emitted entity event"
        );
        reached
    }

    pub fn emit_created(&self, entity: UiEntity<D::Entry>) -> usize {
        self.emit(EntityEvent::Created { entity })
    }

    pub fn emit_updated(&self, entity: UiEntity<D::Entry>) -> usize {
        self.emit(EntityEvent::Updated { entity })
    }

    pub fn emit_deleted(&self, original: ActionHash) -> usize {
        self.emit(EntityEvent::Deleted { original })
    }

    pub fn emit_status_changed(&self, original: ActionHash, from: Option<Status>, to: Status) -> usize {
        self.emit(EntityEvent::StatusChanged { original, from, to })
    }

    /// Every event, unfiltered.
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&EntityEvent<D::Entry>) + Send + Sync + 'static,
    {
        self.bus.subscribe(handler)
    }

    pub fn on_created<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&UiEntity<D::Entry>) + Send + Sync + 'static,
    {
        self.bus.subscribe(move |event| {
            if let EntityEvent::Created { entity } = event {
                handler(entity);
            }
        })
    }

    pub fn on_updated<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&UiEntity<D::Entry>) + Send + Sync + 'static,
    {
        self.bus.subscribe(move |event| {
            if let EntityEvent::Updated { entity } = event {
                handler(entity);
            }
        })
    }

    pub fn on_deleted<F>(&self, handler: F) -> Subscription
    where
        F: Fn(ActionHash) + Send + Sync + 'static,
    {
        self.bus.subscribe(move |event| {
            if let EntityEvent::Deleted { original } = event {
                handler(*original);
            }
        })
    }

    pub fn on_status_changed<F>(&self, handler: F) -> Subscription
    where
        F: Fn(ActionHash, Option<Status>, Status) + Send + Sync + 'static,
    {
        self.bus.subscribe(move |event| {
            if let EntityEvent::StatusChanged { original, from, to } = event {
                handler(*original, *from, *to);
            }
        })
    }

    pub fn stream(&self) -> broadcast::Receiver<EntityEvent<D::Entry>> {
        self.bus.stream()
    }

    pub fn subscriber_count(&self) -> usize {
        self.bus.subscriber_count()
    }
}

impl<D: Domain> Clone for DomainEvents<D> {
    fn clone(&self) -> Self {
        Self {
            bus: self.bus.clone(),
            _domain: PhantomData,
        }
    }
}

impl<D: Domain> std::fmt::Debug for DomainEvents<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomainEvents")
            .field("domain", &D::NAME)
            .field("bus", &self.bus)
            .finish()
    }
}
