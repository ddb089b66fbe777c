//! Per-domain parametrisation of the moderation pattern.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

use crate::kernel::ZomeFunctions;

/// Describes one moderated domain (service types, mediums of exchange, ...)
///
/// Implemented on a zero-sized marker type; the generic service and store are
/// instantiated once per implementation.
pub trait Domain: Send + Sync + 'static {
    /// Payload stored by the remote runtime
    type Entry: Serialize + DeserializeOwned + Clone + Debug + PartialEq + Send + Sync + 'static;

    /// Entity name, singular (`service_type`)
    const NAME: &'static str;

    /// Entity name, plural (`service_types`)
    const PLURAL: &'static str;

    /// Remote zome hosting the domain's functions
    const ZOME: &'static str;

    /// Local pre-flight validation, mirroring the remote integrity rules.
    fn validate(entry: &Self::Entry) -> Result<(), String> {
        let _ = entry;
        Ok(())
    }

    /// Normalise an entry before it is created or suggested.
    fn prepare(entry: Self::Entry) -> Self::Entry {
        entry
    }

    /// Short human-readable label used in logs.
    fn label(entry: &Self::Entry) -> String;

    fn functions() -> ZomeFunctions {
        ZomeFunctions::for_entity(Self::NAME, Self::PLURAL)
    }
}
