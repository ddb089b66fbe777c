//! # Pubsub
//!
//! A typed, in-process publish/subscribe bus.
//!
//! ## Core Concepts
//!
//! - [`Event`] = any `Clone + Send + Sync + 'static` value (blanket impl)
//! - [`EventBus`] = one bus per event type, checked at compile time
//! - [`Subscription`] = handle returned by [`EventBus::subscribe`]
//!
//! Two delivery paths share a single `emit`:
//!
//! ```text
//! emit(event)
//!     │
//!     ├─► callback 1 ─┐
//!     ├─► callback 2  │  synchronous, registration order,
//!     └─► callback n ─┘  before emit() returns
//!     │
//!     └─► broadcast::Sender ─► stream() receivers (async)
//! ```
//!
//! ## Guarantees
//!
//! - **Synchronous callbacks**: every registered callback has run when `emit` returns
//! - **At-most-once streams**: slow stream receivers may miss events (`RecvError::Lagged`)
//! - **In-memory only**: nothing is persisted, nothing survives a restart
//! - **Idempotent unsubscribe**: calling [`Subscription::unsubscribe`] twice is harmless
//!
//! ## Example
//!
//! ```ignore
//! use pubsub::EventBus;
//!
//! #[derive(Debug, Clone)]
//! enum ListingEvent {
//!     Created { id: u64 },
//!     Deleted { id: u64 },
//! }
//!
//! let bus = EventBus::<ListingEvent>::new();
//!
//! let subscription = bus.subscribe(|event| {
//!     tracing::info!(?event, "listing changed");
//! });
//!
//! bus.emit(ListingEvent::Created { id: 7 });
//!
//! subscription.unsubscribe();
//! subscription.unsubscribe(); // no-op
//! ```

mod bus;
mod core;
mod subscription;

pub use crate::core::Event;

pub use bus::{EventBus, DEFAULT_CAPACITY};

pub use subscription::{Subscription, SubscriptionId};
