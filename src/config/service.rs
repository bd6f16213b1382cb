//! # Config Service
//!
//! The service applications register under `app.config`. It reads and merges a list
//! of config files and answers dot-path queries against the result.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, info};

use super::error::ConfigError;
use super::loader::load_fragment;
use super::store::ConfigStore;
use crate::framework::{
    ConstructibleService, Service, ServiceBase, ServiceContext, ServiceError, ServiceResult,
};

/// Reads config files on launch and merges them in order.
///
/// Configure it with `{"files": [...]}`; files that do not exist are skipped.
///
/// ```rust
/// use serde_json::json;
/// use soa_recipe::config::ConfigService;
///
/// let mut config = ConfigService::new();
/// config.set_configs([json!({ "a": { "b": 1 } }), json!({ "a": { "c": 2 } })]);
///
/// assert_eq!(config.get("a.b"), Some(&json!(1)));
/// assert_eq!(config.get_as::<u32>("a.c"), Some(2));
/// ```
#[derive(Debug, Default)]
pub struct ConfigService {
    base: ServiceBase,
    files: Vec<PathBuf>,
    store: ConfigStore,
}

impl ConfigService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn set_files<I, P>(&mut self, files: I) -> &mut Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.files = files.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the config with the merge of every existing file, in order.
    ///
    /// # Errors
    /// Returns the first file that exists but cannot be read or parsed. The
    /// current config is left untouched in that case.
    pub fn read_config(&mut self) -> Result<&mut Self, ConfigError> {
        let mut store = ConfigStore::new();

        let mut loaded = 0;
        for file in &self.files {
            if let Some(fragment) = load_fragment(file)? {
                store.merge_config(fragment);
                loaded += 1;
            }
        }

        self.store = store;
        info!(files = self.files.len(), loaded, "Config loaded");
        Ok(self)
    }

    /// The live config tree.
    pub fn config(&self) -> &Map<String, Value> {
        self.store.hash()
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ConfigStore {
        &mut self.store
    }

    /// Replaces the config with a single fragment.
    pub fn set_config(&mut self, config: Value) -> &mut Self {
        self.store.set_config(config);
        self
    }

    /// Replaces the config with the merge of all fragments.
    pub fn set_configs<I>(&mut self, configs: I) -> &mut Self
    where
        I: IntoIterator<Item = Value>,
    {
        self.store.set_configs(configs);
        self
    }

    /// Looks up a dot-separated key such as `srv.module.feature.setting`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.store.get(key)
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a Value) -> &'a Value {
        self.store.get_or(key, default)
    }

    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.store.get_as(key)
    }
}

impl Service for ConfigService {
    fn base(&self) -> &ServiceBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ServiceBase {
        &mut self.base
    }

    /// Accepts an optional `files` list. Everything else in the config is ignored.
    fn configure(&mut self, _ctx: &ServiceContext, config: Option<Value>) -> ServiceResult<()> {
        let Some(files) = config.as_ref().and_then(|config| config.get("files")) else {
            return Ok(());
        };

        let files: Vec<PathBuf> = serde_json::from_value(files.clone())
            .map_err(|e| ServiceError::InvalidConfig(format!("files: {e}")))?;
        debug!(files = ?files, "Config files set");
        self.set_files(files);
        Ok(())
    }

    fn launch(&mut self, _ctx: &ServiceContext) -> ServiceResult<()> {
        self.read_config()?;
        Ok(())
    }
}

impl ConstructibleService for ConfigService {
    fn create(ctx: &ServiceContext) -> Self {
        Self {
            base: ServiceBase::with_context(ctx),
            ..Self::default()
        }
    }
}

/// Convenience for tests and tools: reads the given files into a fresh service.
pub fn read_files<P: AsRef<Path>>(files: &[P]) -> Result<ConfigService, ConfigError> {
    let mut service = ConfigService::new();
    service.set_files(files.iter().map(|f| f.as_ref().to_path_buf()));
    service.read_config()?;
    Ok(service)
}
