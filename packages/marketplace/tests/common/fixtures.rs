//! Test fixtures for marketplace entries.

use marketplace_core::domains::mediums_of_exchange::{ExchangeType, MediumOfExchange};
use marketplace_core::domains::service_types::ServiceType;

pub fn service_type(name: &str) -> ServiceType {
    ServiceType::new(name, format!("{name} services"))
}

pub fn web_development() -> ServiceType {
    ServiceType::new("Web Development", "Building websites and web applications")
        .technical()
        .with_tags(["javascript", "html", "css"])
}

pub fn graphic_design() -> ServiceType {
    ServiceType::new("Graphic Design", "Logos, branding and print design").with_tags(["design"])
}

pub fn tutoring() -> ServiceType {
    ServiceType::new("Tutoring", "One to one lessons")
}

pub fn euro() -> MediumOfExchange {
    MediumOfExchange::new("EUR", "Euro", ExchangeType::Currency).with_description("Euro currency")
}

pub fn pay_it_forward() -> MediumOfExchange {
    MediumOfExchange::new("PAY_IT_FORWARD", "Pay it Forward", ExchangeType::Base)
}

pub fn time_bank() -> MediumOfExchange {
    MediumOfExchange::new("TIME", "Time Banking", ExchangeType::Base)
        .with_description("One hour of service for one hour of service")
}
