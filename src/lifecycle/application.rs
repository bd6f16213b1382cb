//! # Application Orchestrator
//!
//! The [`Application`] is the composition root: it loads the configuration, builds
//! every service declared under `app.services`, and drives them through their
//! lifecycle.
//!
//! ## Phases
//!
//! Services are driven breadth-first, one phase at a time:
//!
//! ```text
//! configure(s1) configure(s2) ... configure(sN)
//! bootstrap(s1) bootstrap(s2) ... bootstrap(sN)
//! launch(s1)    launch(s2)    ... launch(sN)
//! ```
//!
//! No service bootstraps before every service is configured, and no service
//! launches before every service is bootstrapped. Within a phase, services run in
//! declaration order.
//!
//! ## Config Keys
//!
//! Each service receives the config found under its resolved config key (see
//! [`resolve_config_key`]). When nothing declares a key, the registry key is used.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::catalog::ServiceCatalog;
use super::definition::{resolve_config_key, ConfigKeyResolution, ServiceDefinition};
use crate::config::ConfigService;
use crate::framework::{
    ConfigKey, ConstructibleService, Phase, Service, ServiceBase, ServiceContext, ServiceError,
    ServiceHandle, ServiceRegistry, ServiceResult, Strictness,
};

/// Registry key of the shared config service.
pub const APP_CONFIG_SERVICE_KEY: &str = "app.config";

/// Config path of the declarative service map.
pub const SERVICES_CONFIG_KEY: &str = "app.services";

/// Config path of the registry-wide strict flag.
pub const STRICT_MODE_CONFIG_KEY: &str = "service-manager.strictMode";

/// Where the application gets its configuration from.
///
/// `files` wins over `configs` when both are given.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ApplicationConfig {
    /// Config files to read and merge, in order. Missing files are skipped.
    #[serde(default)]
    pub files: Option<Vec<PathBuf>>,

    /// Pre-built config fragments to merge, in order.
    #[serde(default)]
    pub configs: Option<Vec<Value>>,
}

impl ApplicationConfig {
    pub fn from_files<I, P>(files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            files: Some(files.into_iter().map(Into::into).collect()),
            configs: None,
        }
    }

    pub fn from_configs<I>(configs: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        Self {
            files: None,
            configs: Some(configs.into_iter().collect()),
        }
    }
}

/// A declared service that made it into the registry.
struct LoadedService {
    key: String,
    handle: ServiceHandle,
    resolution: ConfigKeyResolution,
}

/// The service-oriented application.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use soa_recipe::framework::BasicService;
/// use soa_recipe::lifecycle::{Application, ApplicationConfig};
///
/// let mut app = Application::new();
/// app.catalog_mut().register::<BasicService>("basic");
/// app.configure_with(ApplicationConfig::from_configs([json!({
///     "app": { "services": { "first": "basic", "second": "basic" } },
///     "first": { "enabled": true }
/// })]));
/// app.start().unwrap();
///
/// assert!(app.registry().has("first"));
/// assert!(app.registry().has("second"));
/// ```
pub struct Application {
    base: ServiceBase,
    ctx: ServiceContext,
    catalog: ServiceCatalog,
    application_config: Option<ApplicationConfig>,
    config_service: Option<Rc<RefCell<ConfigService>>>,
    launched: Vec<String>,
}

impl Application {
    /// Creates an application with its own registry.
    pub fn new() -> Self {
        Self::with_context(ServiceContext::default())
    }

    /// Creates an application on top of an existing registry.
    pub fn with_registry(registry: Rc<ServiceRegistry>) -> Self {
        Self::with_context(ServiceContext::new(registry))
    }

    pub fn with_context(ctx: ServiceContext) -> Self {
        Self {
            base: ServiceBase::with_context(&ctx),
            ctx,
            catalog: ServiceCatalog::new(),
            application_config: None,
            config_service: None,
            launched: Vec::new(),
        }
    }

    pub fn registry(&self) -> &Rc<ServiceRegistry> {
        self.ctx.registry()
    }

    pub fn context(&self) -> &ServiceContext {
        &self.ctx
    }

    pub fn catalog(&self) -> &ServiceCatalog {
        &self.catalog
    }

    /// The catalog used to build declared services. Register types before `launch`.
    pub fn catalog_mut(&mut self) -> &mut ServiceCatalog {
        &mut self.catalog
    }

    /// The config service, available after `bootstrap`.
    pub fn config_service(&self) -> Option<&Rc<RefCell<ConfigService>>> {
        self.config_service.as_ref()
    }

    /// Sets the config service to use when none is registered under `app.config`.
    pub fn set_config_service(&mut self, config_service: Rc<RefCell<ConfigService>>) -> &mut Self {
        self.config_service = Some(config_service);
        self
    }

    /// Typed counterpart of [`Service::configure`].
    pub fn configure_with(&mut self, config: ApplicationConfig) -> &mut Self {
        self.application_config = Some(config);
        self
    }

    /// Keys of the services driven by the last `launch`, in declaration order.
    pub fn launched_services(&self) -> &[String] {
        &self.launched
    }

    /// Bootstraps and launches the application with its own context.
    pub fn start(&mut self) -> ServiceResult<()> {
        let ctx = self.ctx.clone();
        self.bootstrap(&ctx)?;
        self.launch(&ctx)
    }

    /// Reuses the registered config service, or registers a new one.
    fn resolve_config_service(&self) -> ServiceResult<Rc<RefCell<ConfigService>>> {
        let registry = self.registry();

        if let Some(handle) = registry.get_with(APP_CONFIG_SERVICE_KEY, Strictness::Lenient)? {
            return handle
                .downcast::<ConfigService>()
                .ok_or_else(|| ServiceError::UnexpectedType(APP_CONFIG_SERVICE_KEY.to_string()));
        }

        let config_service = match &self.config_service {
            Some(existing) => existing.clone(),
            None => Rc::new(RefCell::new(ConfigService::create(&self.ctx))),
        };
        registry.set(APP_CONFIG_SERVICE_KEY, ServiceHandle::from_rc(config_service.clone()))?;
        debug!(service = APP_CONFIG_SERVICE_KEY, "Config service registered");
        Ok(config_service)
    }

    /// Builds and registers every declared service.
    fn instantiate(&self, config_service: &RefCell<ConfigService>) -> ServiceResult<Vec<LoadedService>> {
        let declared = config_service
            .borrow()
            .get(SERVICES_CONFIG_KEY)
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        let registry = self.registry();
        let mut pending = Vec::with_capacity(declared.len());

        for (key, raw) in &declared {
            let Some(definition) = ServiceDefinition::parse(key, raw) else {
                debug!(service = %key, "No service declared, skipping");
                continue;
            };
            let Some(entry) = self.catalog.get(&definition.service) else {
                warn!(service = %key, tag = %definition.service, "Unknown service type, skipping");
                continue;
            };

            let handle = entry.create(&self.ctx);
            registry.set(key.as_str(), handle.clone())?;
            debug!(service = %key, tag = %definition.service, "Service created");

            pending.push((key.clone(), handle, definition.config_key, entry.static_config_key().cloned()));
        }

        // resolve every config key before the first configure call
        let mut loaded = Vec::with_capacity(pending.len());
        for (key, handle, definition_key, type_key) in pending {
            let instance_key: Option<ConfigKey> = handle.try_borrow()?.config_key();
            let resolution = resolve_config_key(
                definition_key.as_ref(),
                instance_key.as_ref(),
                type_key.as_ref(),
            );
            debug!(service = %key, ?resolution, "Config key resolved");
            loaded.push(LoadedService {
                key,
                handle,
                resolution,
            });
        }

        Ok(loaded)
    }
}

impl Default for Application {
    fn default() -> Self {
        Self::new()
    }
}

fn lifecycle_error(key: &str, phase: Phase) -> impl FnOnce(ServiceError) -> ServiceError + '_ {
    move |source| ServiceError::Lifecycle {
        key: key.to_string(),
        phase,
        source: Box::new(source),
    }
}

impl Service for Application {
    fn base(&self) -> &ServiceBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ServiceBase {
        &mut self.base
    }

    /// Accepts `{"files": [...]}` or `{"configs": [...]}`. No config means an empty one.
    fn configure(&mut self, _ctx: &ServiceContext, config: Option<Value>) -> ServiceResult<()> {
        let config = match config {
            Some(value) => ApplicationConfig::deserialize(value)
                .map_err(|e| ServiceError::InvalidConfig(e.to_string()))?,
            None => ApplicationConfig::default(),
        };
        self.configure_with(config);
        Ok(())
    }

    /// Prepares the shared config service and applies the registry's strict flag.
    fn bootstrap(&mut self, _ctx: &ServiceContext) -> ServiceResult<()> {
        let config_service = self.resolve_config_service()?;
        let application_config = self.application_config.clone().unwrap_or_default();

        if let Some(files) = application_config.files {
            let mut service = config_service.borrow_mut();
            service.set_files(files);
            service.configure(&self.ctx, None)?;
            service.bootstrap(&self.ctx)?;
            service.launch(&self.ctx)?;
        } else if let Some(configs) = application_config.configs {
            config_service.borrow_mut().set_configs(configs);
        }

        let strict = config_service.borrow().get_as::<bool>(STRICT_MODE_CONFIG_KEY);
        if let Some(strict) = strict {
            self.registry().set_strict_mode(strict);
            info!(strict, "Registry strict mode set from config");
        }

        self.config_service = Some(config_service);
        Ok(())
    }

    /// Builds the declared services and drives them through all three phases.
    fn launch(&mut self, _ctx: &ServiceContext) -> ServiceResult<()> {
        let config_service = self
            .config_service
            .clone()
            .ok_or_else(|| ServiceError::NotReady("application launched before bootstrap".into()))?;

        let services = self.instantiate(&config_service)?;
        info!(count = services.len(), "Services registered");

        // =====================================================================
        // Phase 1: configure all
        // =====================================================================
        for service in &services {
            // an explicit null under the key means no config
            let config = service
                .resolution
                .path(&service.key)
                .and_then(|path| config_service.borrow().get(path).cloned())
                .filter(|value| !value.is_null());

            service
                .handle
                .try_borrow_mut()
                .and_then(|mut handle| handle.configure(&self.ctx, config))
                .map_err(lifecycle_error(&service.key, Phase::Configure))?;
        }
        info!(count = services.len(), "Services configured");

        // =====================================================================
        // Phase 2: bootstrap all
        // =====================================================================
        for service in &services {
            service
                .handle
                .try_borrow_mut()
                .and_then(|mut handle| handle.bootstrap(&self.ctx))
                .map_err(lifecycle_error(&service.key, Phase::Bootstrap))?;
        }
        info!(count = services.len(), "Services bootstrapped");

        // =====================================================================
        // Phase 3: launch all
        // =====================================================================
        for service in &services {
            service
                .handle
                .try_borrow_mut()
                .and_then(|mut handle| handle.launch(&self.ctx))
                .map_err(lifecycle_error(&service.key, Phase::Launch))?;
        }
        info!(count = services.len(), "Services launched");

        self.launched = services.into_iter().map(|service| service.key).collect();
        Ok(())
    }
}

impl ConstructibleService for Application {
    fn create(ctx: &ServiceContext) -> Self {
        Self::with_context(ctx.clone())
    }
}
