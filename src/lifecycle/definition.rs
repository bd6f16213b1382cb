//! # Service Definitions
//!
//! Parsing of the declarative `app.services` map and the config-key resolution
//! chain applied to every declared service.
//!
//! ## Accepted Shapes
//!
//! ```json
//! {
//!   "app": {
//!     "services": {
//!       "mailer": "mailer",
//!       "audit":  { "service": "recorder", "configKey": "logging.audit" },
//!       "cache":  { "service": "cache", "configKey": null },
//!       "legacy": null
//!     }
//!   }
//! }
//! ```
//!
//! A bare string is shorthand for `{ "service": <tag> }`. `null`, `false`, a
//! definition whose `service` is `null` and any other shape declare nothing.

use serde_json::Value;
use tracing::warn;

use crate::config::store::value_kind;
use crate::framework::ConfigKey;

/// A declared service, normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDefinition {
    /// Catalog tag of the service type.
    pub service: String,
    /// `None` when the definition does not mention `configKey` at all.
    pub config_key: Option<ConfigKey>,
}

impl ServiceDefinition {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            config_key: None,
        }
    }

    pub fn with_config_key(mut self, key: ConfigKey) -> Self {
        self.config_key = Some(key);
        self
    }

    /// Normalizes a raw definition. Returns `None` for definitions that declare nothing.
    pub fn parse(key: &str, raw: &Value) -> Option<Self> {
        match raw {
            Value::Null | Value::Bool(false) => None,
            Value::String(tag) => Some(Self::new(tag.as_str())),
            Value::Object(fields) => {
                let service = match fields.get("service") {
                    Some(Value::String(tag)) => tag.clone(),
                    Some(Value::Null) | None => return None,
                    Some(other) => {
                        warn!(service = %key, kind = value_kind(other), "Invalid service tag");
                        return None;
                    }
                };

                let config_key = match fields.get("configKey") {
                    None => None,
                    Some(Value::Null) => Some(ConfigKey::Disabled),
                    Some(Value::String(path)) => Some(ConfigKey::Path(path.clone())),
                    Some(other) => {
                        warn!(service = %key, kind = value_kind(other), "Ignoring invalid configKey");
                        None
                    }
                };

                Some(Self { service, config_key })
            }
            other => {
                warn!(service = %key, kind = value_kind(other), "Invalid service definition");
                None
            }
        }
    }
}

/// Outcome of the config-key resolution chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigKeyResolution {
    /// Configure with the value found at this path.
    Explicit(String),
    /// Configure without any config.
    NoConfig,
    /// Nothing declared: use the registry key as the path.
    Fallback,
}

impl ConfigKeyResolution {
    /// The path to read the service's config from, if any.
    pub fn path<'a>(&'a self, service_key: &'a str) -> Option<&'a str> {
        match self {
            ConfigKeyResolution::Explicit(path) => Some(path.as_str()),
            ConfigKeyResolution::NoConfig => None,
            ConfigKeyResolution::Fallback => Some(service_key),
        }
    }
}

/// Resolves a service's config key. First declared level wins:
///
/// 1. the key on the service definition
/// 2. the instance-level key
/// 3. the type-level key
///
/// An explicit [`ConfigKey::Disabled`] at any level stops the chain.
pub fn resolve_config_key(
    definition: Option<&ConfigKey>,
    instance: Option<&ConfigKey>,
    type_level: Option<&ConfigKey>,
) -> ConfigKeyResolution {
    match definition.or(instance).or(type_level) {
        Some(ConfigKey::Path(path)) => ConfigKeyResolution::Explicit(path.clone()),
        Some(ConfigKey::Disabled) => ConfigKeyResolution::NoConfig,
        None => ConfigKeyResolution::Fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_shapes() {
        assert_eq!(
            ServiceDefinition::parse("s", &json!("greeter")),
            Some(ServiceDefinition::new("greeter"))
        );
        assert_eq!(
            ServiceDefinition::parse("s", &json!({ "service": "greeter" })),
            Some(ServiceDefinition::new("greeter"))
        );
        assert_eq!(
            ServiceDefinition::parse("s", &json!({ "service": "greeter", "configKey": "custom" })),
            Some(ServiceDefinition::new("greeter").with_config_key(ConfigKey::path("custom")))
        );
        assert_eq!(
            ServiceDefinition::parse("s", &json!({ "service": "greeter", "configKey": null })),
            Some(ServiceDefinition::new("greeter").with_config_key(ConfigKey::Disabled))
        );
    }

    #[test]
    fn test_parse_skips_empty_definitions() {
        for raw in [
            json!(null),
            json!(false),
            json!({ "service": null }),
            json!({ "configKey": "x" }),
            json!({ "service": 12 }),
            json!(42),
            json!(["greeter"]),
        ] {
            assert_eq!(ServiceDefinition::parse("s", &raw), None, "raw {raw}");
        }
    }

    #[test]
    fn test_invalid_config_key_counts_as_unset() {
        let parsed = ServiceDefinition::parse("s", &json!({ "service": "x", "configKey": 3 }));
        assert_eq!(parsed.unwrap().config_key, None);
    }

    #[test]
    fn test_resolution_precedence() {
        let def = ConfigKey::path("def");
        let inst = ConfigKey::path("inst");
        let ty = ConfigKey::path("type");

        assert_eq!(
            resolve_config_key(Some(&def), Some(&inst), Some(&ty)),
            ConfigKeyResolution::Explicit("def".into())
        );
        assert_eq!(
            resolve_config_key(None, Some(&inst), Some(&ty)),
            ConfigKeyResolution::Explicit("inst".into())
        );
        assert_eq!(
            resolve_config_key(None, None, Some(&ty)),
            ConfigKeyResolution::Explicit("type".into())
        );
        assert_eq!(resolve_config_key(None, None, None), ConfigKeyResolution::Fallback);
    }

    #[test]
    fn test_disabled_stops_the_chain() {
        let off = ConfigKey::Disabled;
        let inst = ConfigKey::path("inst");
        let ty = ConfigKey::path("type");

        assert_eq!(
            resolve_config_key(Some(&off), Some(&inst), Some(&ty)),
            ConfigKeyResolution::NoConfig
        );
        assert_eq!(resolve_config_key(None, Some(&off), Some(&ty)), ConfigKeyResolution::NoConfig);
        assert_eq!(resolve_config_key(None, None, Some(&off)), ConfigKeyResolution::NoConfig);
    }

    #[test]
    fn test_resolution_path() {
        assert_eq!(ConfigKeyResolution::Explicit("x".into()).path("key"), Some("x"));
        assert_eq!(ConfigKeyResolution::NoConfig.path("key"), None);
        assert_eq!(ConfigKeyResolution::Fallback.path("key"), Some("key"));
    }
}
