//! # Observability & Tracing
//!
//! Structured logging for the whole bootstrap sequence.
//!
//! ## Overview
//!
//! The [`setup_tracing`] function initializes a compact `tracing-subscriber`
//! formatter driven by the `RUST_LOG` environment variable.
//!
//! ## What Gets Traced
//!
//! - **Config loading**: files read, files skipped (debug), strict mode changes
//! - **Registry**: registrations and removals (debug)
//! - **Orchestration**: one line per phase with the number of services
//! - **Skipped definitions**: unknown tags and malformed entries (warn)
//!
//! ## Usage Examples
//!
//! ```bash
//! # Phase summaries only
//! RUST_LOG=info cargo run -- config/app.global.json
//!
//! # Per-service steps, including resolved config keys
//! RUST_LOG=debug cargo run -- config/app.global.json
//!
//! # Filter to the orchestrator
//! RUST_LOG=soa_recipe::lifecycle=debug cargo run
//! ```
//!
//! ## Workflow Trace Example
//!
//! **With `RUST_LOG=debug`**:
//!
//! ```text
//! DEBUG Registered service="app.config"
//! DEBUG Loaded config file path="config/app.global.json"
//! DEBUG Config file not found, skipping path="config/app.local.json"
//!  INFO Config loaded files=2 loaded=1
//! DEBUG Service created service="greeter" tag="greeter"
//! DEBUG Config key resolved service="greeter" resolution=Explicit("greeter")
//!  INFO Services registered count=2
//!  INFO Services configured count=2
//!  INFO Services bootstrapped count=2
//!  INFO Hello, world!
//!  INFO Services launched count=2
//! ```

/// Installs the global subscriber. Call once, at process start.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
