// Business domains
pub mod mediums_of_exchange;
pub mod moderation;
pub mod service_types;
