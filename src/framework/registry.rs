//! # Service Registry
//!
//! A key → service directory shared by every service of an application.
//!
//! ## Strict Mode
//!
//! By default the registry is lenient: lookups of unknown keys return `None`,
//! re-registration overwrites and removing an unknown key is a no-op. In strict
//! mode those cases fail with a [`RegistryError`] instead.
//!
//! Strictness is decided per call: [`Strictness::Inherit`] follows the
//! registry-wide flag, [`Strictness::Strict`] and [`Strictness::Lenient`]
//! override it.
//!
//! # Architecture Note
//! The registry is shared through `Rc` and mutated through `&self`. Execution
//! is single-threaded and no borrow of the internal map outlives a method call,
//! so services may freely look up and register peers from their hooks.

use std::any::Any;
use std::cell::{Cell, Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use super::error::{RegistryError, ServiceError, ServiceResult};
use super::service::Service;

/// Per-call strictness override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strictness {
    /// Follow the registry-wide flag.
    #[default]
    Inherit,
    Strict,
    Lenient,
}

impl Strictness {
    fn resolve(self, global: bool) -> bool {
        match self {
            Strictness::Inherit => global,
            Strictness::Strict => true,
            Strictness::Lenient => false,
        }
    }
}

impl From<bool> for Strictness {
    fn from(strict: bool) -> Self {
        if strict {
            Strictness::Strict
        } else {
            Strictness::Lenient
        }
    }
}

impl From<Option<bool>> for Strictness {
    fn from(strict: Option<bool>) -> Self {
        strict.map_or(Strictness::Inherit, Strictness::from)
    }
}

/// A shared reference to a registered service.
///
/// The handle keeps two views of the same allocation: a `dyn Service` view used
/// to drive the lifecycle, and a `dyn Any` view used to get the concrete type back.
#[derive(Clone)]
pub struct ServiceHandle {
    service: Rc<RefCell<dyn Service>>,
    any: Rc<dyn Any>,
}

impl ServiceHandle {
    /// Wraps a freshly built service.
    pub fn new<S: Service>(service: S) -> Self {
        Self::from_rc(Rc::new(RefCell::new(service)))
    }

    /// Wraps a service the caller keeps a typed reference to.
    pub fn from_rc<S: Service>(service: Rc<RefCell<S>>) -> Self {
        Self {
            service: service.clone(),
            any: service,
        }
    }

    /// Recovers the concrete service type, `None` if the handle holds another type.
    pub fn downcast<S: Service>(&self) -> Option<Rc<RefCell<S>>> {
        self.any.clone().downcast::<RefCell<S>>().ok()
    }

    pub fn is<S: Service>(&self) -> bool {
        self.any.is::<RefCell<S>>()
    }

    /// # Panics
    /// If the service is running one of its hooks. Hooks reading peers should use
    /// [`ServiceHandle::try_borrow`].
    pub fn borrow(&self) -> Ref<'_, dyn Service> {
        self.service.borrow()
    }

    /// # Panics
    /// If the service is already borrowed.
    pub fn borrow_mut(&self) -> RefMut<'_, dyn Service> {
        self.service.borrow_mut()
    }

    /// Borrows the service, failing with [`ServiceError::Busy`] while it runs a hook.
    ///
    /// A hook scanning the registry reaches its own entry this way too.
    pub fn try_borrow(&self) -> ServiceResult<Ref<'_, dyn Service>> {
        self.service.try_borrow().map_err(|_| ServiceError::Busy)
    }

    /// Mutably borrows the service, failing with [`ServiceError::Busy`] if it is in use.
    pub fn try_borrow_mut(&self) -> ServiceResult<RefMut<'_, dyn Service>> {
        self.service.try_borrow_mut().map_err(|_| ServiceError::Busy)
    }

    /// Whether both handles point to the same service instance.
    pub fn ptr_eq(&self, other: &ServiceHandle) -> bool {
        Rc::ptr_eq(&self.any, &other.any)
    }
}

impl fmt::Debug for ServiceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceHandle")
            .field("ptr", &Rc::as_ptr(&self.any))
            .finish()
    }
}

/// Key → service directory with optional strict existence checks.
#[derive(Default)]
pub struct ServiceRegistry {
    services: RefCell<HashMap<String, ServiceHandle>>,
    strict: Cell<bool>,
}

impl ServiceRegistry {
    /// Creates an empty, lenient registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a service is registered under `key`.
    pub fn has(&self, key: &str) -> bool {
        self.services.borrow().contains_key(key)
    }

    /// Looks up a service using the registry-wide strictness.
    pub fn get(&self, key: &str) -> Result<Option<ServiceHandle>, RegistryError> {
        self.get_with(key, Strictness::Inherit)
    }

    /// Looks up a service.
    ///
    /// # Errors
    /// [`RegistryError::NotFound`] if the key is unknown and the call is strict.
    pub fn get_with(
        &self,
        key: &str,
        strictness: Strictness,
    ) -> Result<Option<ServiceHandle>, RegistryError> {
        let found = self.services.borrow().get(key).cloned();
        if found.is_none() && self.is_strict(strictness) {
            return Err(RegistryError::NotFound(key.to_string()));
        }
        Ok(found)
    }

    /// Registers a service using the registry-wide strictness.
    pub fn set(&self, key: impl Into<String>, service: ServiceHandle) -> Result<(), RegistryError> {
        self.set_with(key, service, Strictness::Inherit)
    }

    /// Registers a service, replacing any previous one when lenient.
    ///
    /// # Errors
    /// [`RegistryError::AlreadyRegistered`] if the key is taken and the call is strict.
    pub fn set_with(
        &self,
        key: impl Into<String>,
        service: ServiceHandle,
        strictness: Strictness,
    ) -> Result<(), RegistryError> {
        let key = key.into();
        let mut services = self.services.borrow_mut();
        if services.contains_key(&key) && self.is_strict(strictness) {
            return Err(RegistryError::AlreadyRegistered(key));
        }
        debug!(service = %key, "Registered");
        services.insert(key, service);
        Ok(())
    }

    /// Removes a service using the registry-wide strictness.
    pub fn remove(&self, key: &str) -> Result<Option<ServiceHandle>, RegistryError> {
        self.remove_with(key, Strictness::Inherit)
    }

    /// Removes a service and returns it.
    ///
    /// # Errors
    /// [`RegistryError::NotFound`] if the key is unknown and the call is strict.
    pub fn remove_with(
        &self,
        key: &str,
        strictness: Strictness,
    ) -> Result<Option<ServiceHandle>, RegistryError> {
        let removed = self.services.borrow_mut().remove(key);
        if removed.is_none() && self.is_strict(strictness) {
            return Err(RegistryError::NotFound(key.to_string()));
        }
        if removed.is_some() {
            debug!(service = %key, "Removed");
        }
        Ok(removed)
    }

    /// The registry-wide strict flag. Lenient by default.
    pub fn strict_mode(&self) -> bool {
        self.strict.get()
    }

    pub fn set_strict_mode(&self, strict: bool) -> &Self {
        self.strict.set(strict);
        self
    }

    /// Registered keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.services.borrow().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.services.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.borrow().is_empty()
    }

    fn is_strict(&self, strictness: Strictness) -> bool {
        strictness.resolve(self.strict.get())
    }
}

impl fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceRegistry")
            .field("keys", &self.keys())
            .field("strict", &self.strict.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::BasicService;

    fn dummy() -> ServiceHandle {
        ServiceHandle::new(BasicService::new())
    }

    #[test]
    fn test_set_get_has_remove() {
        let registry = ServiceRegistry::new();
        let service = dummy();

        assert!(!registry.has("dummy"));
        registry.set("dummy", service.clone()).unwrap();
        assert!(registry.has("dummy"));
        assert!(registry.get("dummy").unwrap().unwrap().ptr_eq(&service));

        registry.remove("dummy").unwrap();
        assert!(!registry.has("dummy"));
    }

    #[test]
    fn test_non_strict_by_default() {
        let registry = ServiceRegistry::new();
        assert!(!registry.strict_mode());

        assert!(registry.get("missing").unwrap().is_none());
        assert!(registry.remove("missing").unwrap().is_none());
        registry.set("twice", dummy()).unwrap();
        registry.set("twice", dummy()).unwrap();
    }

    #[test]
    fn test_strict_per_call() {
        let registry = ServiceRegistry::new();

        assert_eq!(
            registry.get_with("missing", Strictness::Strict).unwrap_err(),
            RegistryError::NotFound("missing".into())
        );
        assert!(registry.get_with("missing", Strictness::Lenient).unwrap().is_none());

        registry.set_with("existent", dummy(), Strictness::Strict).unwrap();
        assert!(registry.get_with("existent", Strictness::Strict).unwrap().is_some());
        assert_eq!(
            registry.set_with("existent", dummy(), Strictness::Strict).unwrap_err(),
            RegistryError::AlreadyRegistered("existent".into())
        );

        assert!(registry.remove_with("missing", Strictness::Strict).is_err());
        assert!(registry.remove_with("existent", Strictness::Strict).unwrap().is_some());
    }

    #[test]
    fn test_global_strict_flag() {
        let registry = ServiceRegistry::new();
        registry.set_strict_mode(true);
        assert!(registry.strict_mode());

        assert!(registry.get("missing").is_err());
        assert!(registry.remove("missing").is_err());
        registry.set("existent", dummy()).unwrap();
        assert!(registry.get("existent").is_ok());
        assert!(registry.set("existent", dummy()).is_err());
        assert!(registry.remove("existent").is_ok());

        registry.set_strict_mode(false);
        assert!(!registry.strict_mode());
        assert!(registry.get("missing").is_ok());
    }

    #[test]
    fn test_lenient_override_beats_global_flag() {
        let registry = ServiceRegistry::new();
        registry.set_strict_mode(true);

        assert!(registry.get_with("missing", false.into()).is_ok());
        assert!(registry.remove_with("missing", false.into()).is_ok());
        registry.set_with("existent", dummy(), Strictness::Lenient).unwrap();
        registry.set_with("existent", dummy(), Strictness::Lenient).unwrap();
    }

    #[test]
    fn test_strictness_from_option() {
        assert_eq!(Strictness::from(None), Strictness::Inherit);
        assert_eq!(Strictness::from(Some(true)), Strictness::Strict);
        assert_eq!(Strictness::from(Some(false)), Strictness::Lenient);
    }

    #[test]
    fn test_handle_downcast() {
        let handle = dummy();
        assert!(handle.is::<BasicService>());
        assert!(handle.downcast::<BasicService>().is_some());

        let typed = Rc::new(RefCell::new(BasicService::new()));
        let handle = ServiceHandle::from_rc(typed.clone());
        assert!(Rc::ptr_eq(&handle.downcast::<BasicService>().unwrap(), &typed));
    }

    #[test]
    fn test_try_borrow_reports_busy_services() {
        let handle = dummy();
        assert!(handle.try_borrow().is_ok());

        let running = handle.borrow_mut();
        assert!(matches!(handle.try_borrow(), Err(ServiceError::Busy)));
        assert!(matches!(handle.try_borrow_mut(), Err(ServiceError::Busy)));
        drop(running);

        let reading = handle.try_borrow().unwrap();
        assert!(handle.try_borrow().is_ok());
        assert!(matches!(handle.try_borrow_mut(), Err(ServiceError::Busy)));
        drop(reading);

        assert!(handle.try_borrow_mut().is_ok());
    }

    #[test]
    fn test_keys_are_sorted() {
        let registry = ServiceRegistry::new();
        registry.set("b", dummy()).unwrap();
        registry.set("a", dummy()).unwrap();

        assert_eq!(registry.keys(), ["a", "b"]);
        assert_eq!(registry.len(), 2);
    }
}
