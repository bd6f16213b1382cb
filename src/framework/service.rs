//! # Service Contract
//!
//! The [`Service`] trait defines the three-phase lifecycle every pluggable component
//! goes through: **configure → bootstrap → launch**.
//!
//! # Architecture Note
//! Rust traits carry no fields, so the state every service shares (its scoped config,
//! its config key override and the registry back-reference) lives in [`ServiceBase`].
//! Implementors embed a `ServiceBase` and hand it out through [`Service::base`] /
//! [`Service::base_mut`]; the provided `configure` then works on it.
//!
//! # Provided Methods (Hooks)
//! All lifecycle hooks have default implementations:
//! - [`Service::configure`] builds a fresh `ConfigStore` from the defaults plus the given config
//! - [`Service::bootstrap`] does nothing
//! - [`Service::launch`] does nothing
//!
//! # Context Injection
//! Every hook receives the [`ServiceContext`]. It is owned by the application and
//! explicitly threaded through the lifecycle, so services never reach for global
//! state to find their peers.

use std::fmt;
use std::rc::{Rc, Weak};

use serde_json::Value;

use super::error::ServiceResult;
use super::registry::ServiceRegistry;
use crate::config::ConfigStore;

/// The orchestrated lifecycle phases, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Configure,
    Bootstrap,
    Launch,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Configure => "configure",
            Phase::Bootstrap => "bootstrap",
            Phase::Launch => "launch",
        };
        f.write_str(name)
    }
}

/// A config key setting.
///
/// Wherever a config key can be declared, "not declared" is modelled as
/// `Option::None`, so `Option<ConfigKey>` distinguishes all three states:
/// unset, an explicit path, and an explicit "no config".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigKey {
    /// Dot-separated path into the global configuration.
    Path(String),
    /// Explicitly configure the service without any config.
    Disabled,
}

impl ConfigKey {
    pub fn path(path: impl Into<String>) -> Self {
        ConfigKey::Path(path.into())
    }
}

impl From<&str> for ConfigKey {
    fn from(path: &str) -> Self {
        ConfigKey::Path(path.to_string())
    }
}

impl From<Option<String>> for ConfigKey {
    fn from(path: Option<String>) -> Self {
        path.map_or(ConfigKey::Disabled, ConfigKey::Path)
    }
}

/// Explicit context handed to factories and lifecycle hooks.
///
/// Cloning is cheap; all clones share the same registry.
#[derive(Clone, Default)]
pub struct ServiceContext {
    registry: Rc<ServiceRegistry>,
}

impl ServiceContext {
    pub fn new(registry: Rc<ServiceRegistry>) -> Self {
        Self { registry }
    }

    /// The shared service registry.
    pub fn registry(&self) -> &Rc<ServiceRegistry> {
        &self.registry
    }
}

impl fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceContext")
            .field("services", &self.registry.len())
            .field("strict", &self.registry.strict_mode())
            .finish()
    }
}

/// Per-instance state shared by every service.
///
/// The registry back-reference is weak: the registry owns the services, so a
/// strong reference would keep both alive forever.
#[derive(Debug, Default)]
pub struct ServiceBase {
    registry: Option<Weak<ServiceRegistry>>,
    service_config: Option<ConfigStore>,
    config_key: Option<ConfigKey>,
}

impl ServiceBase {
    /// Creates a base without a registry back-reference.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a base bound to the context's registry.
    pub fn with_context(ctx: &ServiceContext) -> Self {
        Self {
            registry: Some(Rc::downgrade(ctx.registry())),
            ..Self::default()
        }
    }

    /// Returns the registry this service was created for, if it is still alive.
    pub fn registry(&self) -> Option<Rc<ServiceRegistry>> {
        self.registry.as_ref().and_then(Weak::upgrade)
    }

    pub fn set_registry(&mut self, registry: &Rc<ServiceRegistry>) -> &mut Self {
        self.registry = Some(Rc::downgrade(registry));
        self
    }

    /// The scoped config built by the last `configure` call.
    ///
    /// `None` until the service has been configured at least once.
    pub fn service_config(&self) -> Option<&ConfigStore> {
        self.service_config.as_ref()
    }

    /// Instance-level config key override.
    pub fn config_key(&self) -> Option<&ConfigKey> {
        self.config_key.as_ref()
    }

    pub fn set_config_key(&mut self, key: Option<ConfigKey>) -> &mut Self {
        self.config_key = key;
        self
    }

    /// Rebuilds the scoped config: defaults first, then the given config on top.
    ///
    /// The previous scoped config is discarded, so repeated calls do not accumulate.
    pub fn apply_config(&mut self, defaults: Option<Value>, config: Option<Value>) -> &ConfigStore {
        let mut store = ConfigStore::new();
        if let Some(defaults) = defaults {
            store.set_config(defaults);
        }
        if let Some(config) = config {
            store.merge_config(config);
        }
        self.service_config.insert(store)
    }
}

/// The lifecycle contract every service implements.
///
/// The orchestrator calls `configure` on every declared service before any
/// `bootstrap`, and `bootstrap` on every service before any `launch`. A hook
/// may therefore rely on all peers having reached the previous phase.
///
/// # Example
///
/// ```rust
/// use serde_json::{json, Value};
/// use soa_recipe::framework::{Service, ServiceBase, ServiceContext};
///
/// #[derive(Default)]
/// struct Mailer {
///     base: ServiceBase,
/// }
///
/// impl Service for Mailer {
///     fn base(&self) -> &ServiceBase { &self.base }
///     fn base_mut(&mut self) -> &mut ServiceBase { &mut self.base }
///
///     fn default_service_config(&self) -> Option<Value> {
///         Some(json!({ "smtp": { "host": "localhost", "port": 25 } }))
///     }
/// }
///
/// let ctx = ServiceContext::default();
/// let mut mailer = Mailer::default();
/// mailer.configure(&ctx, Some(json!({ "smtp": { "port": 2525 } }))).unwrap();
///
/// let config = mailer.service_config().unwrap();
/// assert_eq!(config.get("smtp.host"), Some(&json!("localhost")));
/// assert_eq!(config.get("smtp.port"), Some(&json!(2525)));
/// ```
pub trait Service: 'static {
    fn base(&self) -> &ServiceBase;

    fn base_mut(&mut self) -> &mut ServiceBase;

    /// Base config applied before the caller-supplied config. `None` means no defaults.
    fn default_service_config(&self) -> Option<Value> {
        None
    }

    /// Instance-level config key, consulted after the definition's key and
    /// before the type-level key.
    fn config_key(&self) -> Option<ConfigKey> {
        self.base().config_key().cloned()
    }

    /// The scoped config, `None` before the first `configure`.
    fn service_config(&self) -> Option<&ConfigStore> {
        self.base().service_config()
    }

    // --- Lifecycle Hooks ---

    /// Scopes the service's config. Every call starts over from the defaults.
    fn configure(&mut self, _ctx: &ServiceContext, config: Option<Value>) -> ServiceResult<()> {
        let defaults = self.default_service_config();
        self.base_mut().apply_config(defaults, config);
        Ok(())
    }

    /// Sets up the service logic. Every peer is configured at this point.
    fn bootstrap(&mut self, _ctx: &ServiceContext) -> ServiceResult<()> {
        Ok(())
    }

    /// Starts the service logic. Every peer is bootstrapped at this point.
    fn launch(&mut self, _ctx: &ServiceContext) -> ServiceResult<()> {
        Ok(())
    }
}

/// A service type the orchestrator can build from a catalog tag.
pub trait ConstructibleService: Service + Sized {
    /// Builds a fresh instance for the given context.
    fn create(ctx: &ServiceContext) -> Self;

    /// Type-level config key, the last resort before the registry key.
    fn static_config_key() -> Option<ConfigKey> {
        None
    }
}

/// A service with no behaviour beyond the default hooks.
#[derive(Debug, Default)]
pub struct BasicService {
    base: ServiceBase,
}

impl BasicService {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Service for BasicService {
    fn base(&self) -> &ServiceBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ServiceBase {
        &mut self.base
    }
}

impl ConstructibleService for BasicService {
    fn create(ctx: &ServiceContext) -> Self {
        Self {
            base: ServiceBase::with_context(ctx),
        }
    }
}
