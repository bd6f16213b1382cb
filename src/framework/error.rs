//! # Framework Errors
//!
//! This module defines the common error types used throughout the service framework.
//! Registry violations only surface when strictness is requested; everything else in
//! the bootstrap path degrades to defaults, so these enums stay small.

use super::service::Phase;
use crate::config::ConfigError;
use thiserror::Error;

/// Errors raised by the [`ServiceRegistry`](super::ServiceRegistry) in strict mode.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// A strict lookup or removal targeted a key that is not registered.
    #[error("Service not found: {0}")]
    NotFound(String),

    /// A strict registration targeted a key that is already taken.
    #[error("Service already registered: {0}")]
    AlreadyRegistered(String),
}

/// Errors that can occur while driving a service through its lifecycle.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The config handed to `configure` has the wrong shape.
    #[error("Invalid service config: {0}")]
    InvalidConfig(String),

    /// A registry entry holds a different concrete type than the caller expects.
    #[error("Service {0} has an unexpected type")]
    UnexpectedType(String),

    /// A lifecycle step ran before the step it depends on.
    #[error("Service not ready: {0}")]
    NotReady(String),

    /// The service is inside one of its own lifecycle calls and cannot be borrowed.
    #[error("Service is busy in a lifecycle call")]
    Busy,

    /// A service failed during one of the orchestrated phases.
    #[error("Service {key} failed to {phase}: {source}")]
    Lifecycle {
        key: String,
        phase: Phase,
        #[source]
        source: Box<ServiceError>,
    },

    /// Failure raised by a concrete service implementation.
    #[error("Service error: {0}")]
    Custom(Box<dyn std::error::Error + Send + Sync>),
}

/// Result alias used by every lifecycle hook.
pub type ServiceResult<T> = Result<T, ServiceError>;
