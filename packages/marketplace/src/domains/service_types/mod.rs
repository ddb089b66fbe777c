pub mod models;

pub use models::*;

use crate::domains::moderation::{Domain, EntityService, EntityStore};

/// Marker for the service types domain
#[derive(Debug, Clone, Copy, Default)]
pub struct ServiceTypes;

impl Domain for ServiceTypes {
    type Entry = ServiceType;

    const NAME: &'static str = "service_type";
    const PLURAL: &'static str = "service_types";
    const ZOME: &'static str = "service_types";

    fn validate(entry: &ServiceType) -> Result<(), String> {
        entry.validate()
    }

    fn label(entry: &ServiceType) -> String {
        entry.name.clone()
    }
}

pub type ServiceTypesService = EntityService<ServiceTypes>;
pub type ServiceTypesStore = EntityStore<ServiceTypes>;
