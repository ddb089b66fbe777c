// Requests and Offers - marketplace core
//
// Moderated-entity stores for the community exchange marketplace. Every
// domain (service types, mediums of exchange, ...) goes through the same
// three layers: a remote-call service, a reactive store with a TTL cache,
// and typed lifecycle events.
//
// The remote runtime is an external collaborator reached through
// kernel::BaseRemoteRuntime.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;

pub use config::*;
