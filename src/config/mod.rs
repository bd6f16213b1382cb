//! Configuration handling.
//!
//! - [`ConfigStore`] - nested config tree with deep merge and dot-path lookup
//! - [`loader`] - reads JSON / TOML files into mergeable fragments
//! - [`ConfigService`] - the service wrapper applications register under `app.config`

pub mod error;
pub mod loader;
pub mod service;
pub mod store;

pub use error::*;
pub use service::ConfigService;
pub use store::{merge_value, ConfigStore};
