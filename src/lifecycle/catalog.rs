//! # Service Catalog
//!
//! Maps the string tags used in `app.services` to factories.
//!
//! # Architecture Note
//! Config files cannot carry Rust types, so each declared service names a tag
//! instead. The application looks the tag up here and calls the factory with its
//! [`ServiceContext`]. Alongside the factory the catalog keeps the type-level
//! config key, the third level of config-key resolution.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::framework::{ConfigKey, ConstructibleService, ServiceContext, ServiceHandle};

type Factory = Box<dyn Fn(&ServiceContext) -> ServiceHandle>;

/// A registered service type.
pub struct CatalogEntry {
    factory: Factory,
    static_config_key: Option<ConfigKey>,
}

impl CatalogEntry {
    /// Builds a new instance bound to the context.
    pub fn create(&self, ctx: &ServiceContext) -> ServiceHandle {
        (self.factory)(ctx)
    }

    /// The type-level config key.
    pub fn static_config_key(&self) -> Option<&ConfigKey> {
        self.static_config_key.as_ref()
    }
}

/// Tag → factory lookup used to build declared services.
#[derive(Default)]
pub struct ServiceCatalog {
    entries: HashMap<String, CatalogEntry>,
}

impl ServiceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a service type under a tag, replacing any previous entry.
    pub fn register<S: ConstructibleService>(&mut self, tag: impl Into<String>) -> &mut Self {
        self.register_factory(tag, S::static_config_key(), |ctx| {
            ServiceHandle::new(S::create(ctx))
        })
    }

    /// Registers a factory closure under a tag, replacing any previous entry.
    pub fn register_factory<F>(
        &mut self,
        tag: impl Into<String>,
        static_config_key: Option<ConfigKey>,
        factory: F,
    ) -> &mut Self
    where
        F: Fn(&ServiceContext) -> ServiceHandle + 'static,
    {
        let tag = tag.into();
        debug!(%tag, "Service type registered");
        self.entries.insert(
            tag,
            CatalogEntry {
                factory: Box::new(factory),
                static_config_key,
            },
        );
        self
    }

    pub fn get(&self, tag: &str) -> Option<&CatalogEntry> {
        self.entries.get(tag)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.entries.contains_key(tag)
    }
}

impl fmt::Debug for ServiceCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<_> = self.entries.keys().collect();
        tags.sort();
        f.debug_struct("ServiceCatalog").field("tags", &tags).finish()
    }
}
