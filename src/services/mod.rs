//! Demo services used by the binary and the integration tests.

pub mod greeter;
pub mod inventory;

pub use greeter::GreeterService;
pub use inventory::InventoryService;

use crate::lifecycle::ServiceCatalog;

/// Registers every demo service under its tag.
pub fn register_all(catalog: &mut ServiceCatalog) -> &mut ServiceCatalog {
    catalog
        .register::<GreeterService>(GreeterService::TAG)
        .register::<InventoryService>(InventoryService::TAG)
}
