//! Core event trait.

/// A fact that can travel over an [`EventBus`](crate::EventBus).
///
/// Events are cloned once per stream receiver, so keep them cheap to clone
/// (wrap large payloads in `Arc` if needed).
pub trait Event: Clone + Send + Sync + 'static {}

// Blanket implementation for any type that meets the requirements
impl<T: Clone + Send + Sync + 'static> Event for T {}
