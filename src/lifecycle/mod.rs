//! Orchestration layer.
//!
//! - [`Application`] - loads config, builds declared services and drives their lifecycle
//! - [`ServiceCatalog`] - maps `app.services` tags to factories
//! - [`ServiceDefinition`] / [`resolve_config_key`] - declarative service map parsing
//! - [`tracing`] - log setup for binaries

pub mod application;
pub mod catalog;
pub mod definition;
pub mod tracing;

pub use application::{
    Application, ApplicationConfig, APP_CONFIG_SERVICE_KEY, SERVICES_CONFIG_KEY,
    STRICT_MODE_CONFIG_KEY,
};
pub use catalog::{CatalogEntry, ServiceCatalog};
pub use definition::{resolve_config_key, ConfigKeyResolution, ServiceDefinition};
