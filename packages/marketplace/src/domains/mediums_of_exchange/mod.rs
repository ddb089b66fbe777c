pub mod models;

pub use models::*;

use crate::domains::moderation::{Domain, EntityService, EntityStore};

/// Marker for the mediums of exchange domain
#[derive(Debug, Clone, Copy, Default)]
pub struct MediumsOfExchange;

impl Domain for MediumsOfExchange {
    type Entry = MediumOfExchange;

    const NAME: &'static str = "medium_of_exchange";
    const PLURAL: &'static str = "mediums_of_exchange";
    const ZOME: &'static str = "mediums_of_exchange";

    fn validate(entry: &MediumOfExchange) -> Result<(), String> {
        entry.validate()
    }

    /// The resource specification link is assigned by the remote side once
    /// the medium is approved; submissions never carry one.
    fn prepare(mut entry: MediumOfExchange) -> MediumOfExchange {
        entry.resource_spec_hrea_id = None;
        entry
    }

    fn label(entry: &MediumOfExchange) -> String {
        format!("{} ({})", entry.name, entry.code)
    }
}

pub type MediumsOfExchangeService = EntityService<MediumsOfExchange>;
pub type MediumsOfExchangeStore = EntityStore<MediumsOfExchange>;
