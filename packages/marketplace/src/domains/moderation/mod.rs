//! The moderated-entity pattern, written once and instantiated per domain.
//!
//! A domain plugs in through the [`Domain`] trait; [`EntityService`] wraps
//! the remote calls and [`EntityStore`] keeps the reactive, status-partitioned
//! view with its cache and events.

pub mod cache;
pub mod confirm;
pub mod domain;
pub mod events;
pub mod models;
pub mod service;
pub mod store;
pub mod transitions;

pub use cache::EntityCache;
pub use confirm::{wait_for, ConfirmError, ConfirmOptions};
pub use domain::Domain;
pub use events::{DomainEvents, EntityEvent};
pub use models::{EntryInput, StoreSnapshot, UiEntity, UpdateEntryInput};
pub use service::EntityService;
pub use store::{EntityStore, StoreOptions};
pub use transitions::{TransitionPolicy, TransitionTable};
