//! Generic service framework.
//!
//! This module provides the building blocks every service-oriented application
//! is composed of: the lifecycle contract, the shared registry and the context
//! that ties them together.
//!
//! # Main Components
//!
//! - [`Service`] - The configure → bootstrap → launch contract
//! - [`ServiceBase`] - Per-instance state (scoped config, config key, registry back-reference)
//! - [`ServiceRegistry`] - Key → service directory with optional strict mode
//! - [`ServiceContext`] - Explicit context threaded into every hook
//! - [`ServiceError`] / [`RegistryError`] - Common error types
//!
//! # Testing
//!
//! See [`mock`] module for a recording service that tracks lifecycle ordering.

pub mod error;
pub mod mock;
pub mod registry;
pub mod service;

// Re-export core types for convenience
pub use error::{RegistryError, ServiceError, ServiceResult};
pub use registry::{ServiceHandle, ServiceRegistry, Strictness};
pub use service::{
    BasicService, ConfigKey, ConstructibleService, Phase, Service, ServiceBase, ServiceContext,
};
