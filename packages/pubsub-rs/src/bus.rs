//! Typed event bus for broadcasting events.
//!
//! # Guarantees
//!
//! - **Synchronous callbacks**: handlers registered with `subscribe` run inside `emit`
//! - **At-most-once streams**: slow `stream()` receivers may miss events
//! - **In-memory only**: events are not persisted
//! - **No replay**: late subscribers only see events emitted after they subscribed

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};

use tokio::sync::broadcast;

use crate::core::Event;
use crate::subscription::{Detach, Subscription, SubscriptionId};

/// Default channel capacity for stream receivers.
pub const DEFAULT_CAPACITY: usize = 256;

type Handler<E> = Arc<dyn Fn(&E) + Send + Sync>;

struct Registry<E> {
    handlers: RwLock<Vec<(SubscriptionId, Handler<E>)>>,
    next_id: AtomicU64,
}

impl<E: Event> Registry<E> {
    fn new() -> Self {
        Self {
            handlers: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn insert(&self, handler: Handler<E>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, handler));
        id
    }

    /// Copies the handler list so callbacks run without holding the lock.
    fn snapshot(&self) -> Vec<Handler<E>> {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect()
    }

    fn len(&self) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl<E: Event> Detach for Registry<E> {
    fn detach(&self, id: SubscriptionId) -> bool {
        let mut handlers = self
            .handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = handlers.len();
        handlers.retain(|(existing, _)| *existing != id);
        handlers.len() != before
    }

    fn contains(&self, id: SubscriptionId) -> bool {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|(existing, _)| *existing == id)
    }
}

/// Typed event bus.
///
/// One bus carries exactly one event type `E`, so a subscriber can never
/// receive a payload it does not expect. Cloning the bus shares the
/// underlying handlers and channel.
///
/// # Example
///
/// ```ignore
/// let bus = EventBus::<ListingEvent>::new();
///
/// // Synchronous callback
/// let sub = bus.subscribe(|event| println!("{event:?}"));
///
/// // Async stream
/// let mut rx = bus.stream();
///
/// bus.emit(ListingEvent::Created { id: 1 });
/// let event = rx.recv().await?;
/// ```
pub struct EventBus<E: Event> {
    registry: Arc<Registry<E>>,
    sender: broadcast::Sender<E>,
}

impl<E: Event> EventBus<E> {
    /// Create a new event bus with default stream capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a new event bus with the specified stream capacity.
    ///
    /// The capacity determines how many events can be buffered before
    /// slow stream receivers start lagging. Callbacks are unaffected.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            registry: Arc::new(Registry::new()),
            sender,
        }
    }

    /// Register a callback invoked synchronously for every emitted event.
    ///
    /// Callbacks may subscribe or unsubscribe from inside their body; the
    /// change takes effect from the next `emit`.
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = self.registry.insert(Arc::new(handler));
        let registry: Weak<Registry<E>> = Arc::downgrade(&self.registry);
        let registry: Weak<dyn Detach> = registry;
        tracing::trace!(subscription = %id, "callback subscribed");
        Subscription::new(id, registry)
    }

    /// Subscribe to events as an async stream.
    ///
    /// Returns a receiver for all events emitted after this call.
    pub fn stream(&self) -> broadcast::Receiver<E> {
        self.sender.subscribe()
    }

    /// Emit an event to every callback, then to every stream receiver.
    ///
    /// Returns the number of callbacks plus stream receivers reached.
    pub fn emit(&self, event: E) -> usize {
        let handlers = self.registry.snapshot();
        for handler in &handlers {
            handler(&event);
        }
        let receivers = self.sender.send(event).unwrap_or(0);
        handlers.len() + receivers
    }

    /// Returns the number of registered callbacks plus live stream receivers.
    pub fn subscriber_count(&self) -> usize {
        self.registry.len() + self.sender.receiver_count()
    }
}

impl<E: Event> Clone for EventBus<E> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            sender: self.sender.clone(),
        }
    }
}

impl<E: Event> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Event> std::fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("event", &std::any::type_name::<E>())
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}
