//! # Mock Services
//!
//! Utilities for testing orchestration without writing a service per test.
//!
//! [`RecordingService`] implements every lifecycle hook by appending the phase to a
//! shared [`PhaseLog`]. The position of each entry acts as a global clock, so a test
//! can check that every service was configured before any was bootstrapped:
//!
//! ```rust
//! use soa_recipe::framework::mock::{PhaseLog, RecordingService};
//! use soa_recipe::framework::{Phase, Service, ServiceContext};
//!
//! let ctx = ServiceContext::default();
//! let log = PhaseLog::new();
//! let mut a = RecordingService::new(log.clone());
//! let mut b = RecordingService::new(log.clone());
//!
//! a.configure(&ctx, None).unwrap();
//! b.configure(&ctx, None).unwrap();
//! a.bootstrap(&ctx).unwrap();
//! b.bootstrap(&ctx).unwrap();
//!
//! assert!(log.is_phase_ordered());
//! assert_eq!(a.tick(Phase::Configure), Some(0));
//! assert_eq!(b.tick(Phase::Bootstrap), Some(3));
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde_json::Value;

use super::error::{ServiceError, ServiceResult};
use super::service::{ConfigKey, Phase, Service, ServiceBase, ServiceContext};

/// Shared, append-only record of lifecycle calls.
#[derive(Debug, Clone, Default)]
pub struct PhaseLog {
    events: Rc<RefCell<Vec<Phase>>>,
}

impl PhaseLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a phase and returns its tick (position in the log).
    pub fn record(&self, phase: Phase) -> usize {
        let mut events = self.events.borrow_mut();
        events.push(phase);
        events.len() - 1
    }

    pub fn events(&self) -> Vec<Phase> {
        self.events.borrow().clone()
    }

    pub fn count(&self, phase: Phase) -> usize {
        self.events.borrow().iter().filter(|p| **p == phase).count()
    }

    /// Whether the log never goes back to an earlier phase.
    pub fn is_phase_ordered(&self) -> bool {
        let events = self.events.borrow();
        events.windows(2).all(|pair| rank(pair[0]) <= rank(pair[1]))
    }
}

fn rank(phase: Phase) -> u8 {
    match phase {
        Phase::Configure => 0,
        Phase::Bootstrap => 1,
        Phase::Launch => 2,
    }
}

/// A service that records every lifecycle call.
///
/// Optionally fails in a chosen phase, to exercise error propagation.
#[derive(Debug)]
pub struct RecordingService {
    base: ServiceBase,
    log: PhaseLog,
    ticks: HashMap<Phase, usize>,
    received: Option<Value>,
    fail_in: Option<Phase>,
}

impl RecordingService {
    pub fn new(log: PhaseLog) -> Self {
        Self {
            base: ServiceBase::new(),
            log,
            ticks: HashMap::new(),
            received: None,
            fail_in: None,
        }
    }

    /// Builds a recorder bound to the context's registry.
    pub fn with_context(ctx: &ServiceContext, log: PhaseLog) -> Self {
        Self {
            base: ServiceBase::with_context(ctx),
            ..Self::new(log)
        }
    }

    /// Sets the instance-level config key.
    pub fn with_config_key(mut self, key: ConfigKey) -> Self {
        self.base.set_config_key(Some(key));
        self
    }

    /// Makes the given phase return an error.
    pub fn failing_in(mut self, phase: Phase) -> Self {
        self.fail_in = Some(phase);
        self
    }

    /// Tick of the last call to the given phase, `None` if it never ran.
    pub fn tick(&self, phase: Phase) -> Option<usize> {
        self.ticks.get(&phase).copied()
    }

    /// The raw config passed to the last `configure` call.
    pub fn received_config(&self) -> Option<&Value> {
        self.received.as_ref()
    }

    fn enter(&mut self, phase: Phase) -> ServiceResult<()> {
        let tick = self.log.record(phase);
        self.ticks.insert(phase, tick);
        if self.fail_in == Some(phase) {
            return Err(ServiceError::Custom(format!("{phase} failed on purpose").into()));
        }
        Ok(())
    }
}

impl Service for RecordingService {
    fn base(&self) -> &ServiceBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ServiceBase {
        &mut self.base
    }

    fn configure(&mut self, _ctx: &ServiceContext, config: Option<Value>) -> ServiceResult<()> {
        self.received = config.clone();
        self.base.apply_config(None, config);
        self.enter(Phase::Configure)
    }

    fn bootstrap(&mut self, _ctx: &ServiceContext) -> ServiceResult<()> {
        self.enter(Phase::Bootstrap)
    }

    fn launch(&mut self, _ctx: &ServiceContext) -> ServiceResult<()> {
        self.enter(Phase::Launch)
    }
}
