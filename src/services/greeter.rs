//! A service with a default config and a type-level config key.

use serde_json::{json, Value};
use tracing::info;

use crate::framework::{
    ConfigKey, ConstructibleService, Service, ServiceBase, ServiceContext, ServiceError,
    ServiceResult,
};

/// Logs a greeting on launch.
///
/// Reads its config from the `greeter` key unless the definition says otherwise.
#[derive(Debug, Default)]
pub struct GreeterService {
    base: ServiceBase,
    message: Option<String>,
}

impl GreeterService {
    pub const TAG: &'static str = "greeter";

    /// The greeting built during bootstrap.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl Service for GreeterService {
    fn base(&self) -> &ServiceBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ServiceBase {
        &mut self.base
    }

    fn default_service_config(&self) -> Option<Value> {
        Some(json!({ "greeting": "Hello", "target": "world" }))
    }

    fn bootstrap(&mut self, _ctx: &ServiceContext) -> ServiceResult<()> {
        let config = self
            .service_config()
            .ok_or_else(|| ServiceError::NotReady("greeter bootstrapped before configure".into()))?;

        let greeting = config.get_as::<String>("greeting").unwrap_or_default();
        let target = config.get_as::<String>("target").unwrap_or_default();
        self.message = Some(format!("{greeting}, {target}!"));
        Ok(())
    }

    fn launch(&mut self, _ctx: &ServiceContext) -> ServiceResult<()> {
        if let Some(message) = &self.message {
            info!("{message}");
        }
        Ok(())
    }
}

impl ConstructibleService for GreeterService {
    fn create(ctx: &ServiceContext) -> Self {
        Self {
            base: ServiceBase::with_context(ctx),
            message: None,
        }
    }

    fn static_config_key() -> Option<ConfigKey> {
        Some(ConfigKey::path(Self::TAG))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greets_with_defaults() {
        let ctx = ServiceContext::default();
        let mut greeter = GreeterService::create(&ctx);

        greeter.configure(&ctx, None).unwrap();
        greeter.bootstrap(&ctx).unwrap();
        assert_eq!(greeter.message(), Some("Hello, world!"));
    }

    #[test]
    fn test_config_overrides_defaults() {
        let ctx = ServiceContext::default();
        let mut greeter = GreeterService::create(&ctx);

        greeter.configure(&ctx, Some(json!({ "target": "Alice" }))).unwrap();
        greeter.bootstrap(&ctx).unwrap();
        assert_eq!(greeter.message(), Some("Hello, Alice!"));
    }

    #[test]
    fn test_bootstrap_requires_configure() {
        let ctx = ServiceContext::default();
        let mut greeter = GreeterService::create(&ctx);

        assert!(matches!(greeter.bootstrap(&ctx), Err(ServiceError::NotReady(_))));
    }
}
