//! A service that inspects its peers through the context.

use tracing::{debug, info};

use crate::framework::{
    ConstructibleService, Service, ServiceBase, ServiceContext, ServiceError, ServiceResult,
};

/// Records the registry's keys on launch, and which peers carry a scoped config.
///
/// Every declared service is registered before the first hook runs, so the
/// snapshot always covers the whole declared set.
#[derive(Debug, Default)]
pub struct InventoryService {
    base: ServiceBase,
    snapshot: Vec<String>,
    configured: Vec<String>,
}

impl InventoryService {
    pub const TAG: &'static str = "inventory";

    /// Registry keys seen at launch, sorted.
    pub fn snapshot(&self) -> &[String] {
        &self.snapshot
    }

    /// Peers that had been configured with a scoped config at launch, sorted.
    pub fn configured_peers(&self) -> &[String] {
        &self.configured
    }
}

impl Service for InventoryService {
    fn base(&self) -> &ServiceBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ServiceBase {
        &mut self.base
    }

    fn launch(&mut self, ctx: &ServiceContext) -> ServiceResult<()> {
        let registry = ctx.registry();
        self.snapshot = registry.keys();
        self.configured.clear();

        for key in &self.snapshot {
            let Some(handle) = registry.get(key)? else {
                continue;
            };
            // our own entry is held by the orchestrator
            let peer = match handle.try_borrow() {
                Ok(peer) => peer,
                Err(ServiceError::Busy) => {
                    debug!(service = %key, "Skipping busy service");
                    continue;
                }
                Err(e) => return Err(e),
            };
            if peer.service_config().is_some() {
                self.configured.push(key.clone());
            }
        }

        info!(services = ?self.snapshot, configured = ?self.configured, "Inventory");
        Ok(())
    }
}

impl ConstructibleService for InventoryService {
    fn create(ctx: &ServiceContext) -> Self {
        Self {
            base: ServiceBase::with_context(ctx),
            ..Self::default()
        }
    }
}
