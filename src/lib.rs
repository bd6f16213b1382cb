#![doc(html_logo_url = "https://www.rust-lang.org/logos/rust-logo-128x128.png")]
#![doc(html_favicon_url = "https://www.rust-lang.org/favicon.ico")]
//! # SOA Recipe
//!
//! > **A Recipe for Service-oriented Composition Roots in Rust.**
//!
//! This crate demonstrates a pattern for assembling an application out of independent
//! services inside a single process. It combines a **Service Registry**, a three-phase
//! **Lifecycle** and a **Layered Configuration** that is deep-merged from several sources.
//!
//! ## 🏗️ Design Philosophy
//!
//! ### Declarative Composition
//!
//! The set of services is not hard-coded. It is read from the configuration under
//! `app.services`, so environment-specific config files can add, swap or disable
//! services (`"legacy": null`) without touching code.
//!
//! ### Breadth-first Lifecycle
//!
//! Every service goes through **configure → bootstrap → launch**, but the phases are
//! applied to the whole set at a time. When a service bootstraps, every peer has been
//! configured; when it launches, every peer has been bootstrapped.
//!
//! ## 🚀 Core Concepts
//!
//! ### Deep Merge
//! Later config fragments override earlier ones key by key. Mappings merge recursively,
//! sequences are replaced wholesale and `null` deletes a key. See [`config::ConfigStore`].
//!
//! ### Config Keys
//! Each service receives the part of the configuration found under its *config key*.
//! The key is taken from the service definition, the instance, the type, or, failing
//! all of these, the service's registry key. See [`lifecycle::resolve_config_key`].
//!
//! ### Strict Mode
//! The registry is lenient by default. With `service-manager.strictMode: true`, unknown
//! lookups and duplicate registrations fail instead. See [`framework::ServiceRegistry`].
//!
//! ## 👩‍💻 Architecture Notes
//!
//! ### 1. Explicit Context
//! There is no global state. The [`framework::ServiceContext`] owning the registry is
//! created by the application and handed to every factory and lifecycle hook.
//!
//! ### 2. Single-threaded by Design
//! The whole sequence runs once, synchronously, at process start. Shared state uses
//! `Rc` + `RefCell`. A hook reading peers uses `try_borrow`, which reports its own
//! entry as busy.
//!
//! ### 3. Observability
//! We use `tracing` everywhere with structured fields. See [`lifecycle::tracing`].
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Contract ([`framework`])
//! - **Key items**: [`Service`](framework::Service), [`ServiceRegistry`](framework::ServiceRegistry),
//!   [`ServiceContext`](framework::ServiceContext).
//!
//! ### 2. The Configuration ([`config`])
//! - **Key items**: [`ConfigStore`](config::ConfigStore), [`ConfigService`](config::ConfigService).
//!
//! ### 3. The Orchestrator ([`lifecycle`])
//! - **Key items**: [`Application`](lifecycle::Application), [`ServiceCatalog`](lifecycle::ServiceCatalog).
//!
//! ### 4. The Implementation ([`services`])
//! Demo services built using the recipe.
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! RUST_LOG=info cargo run -- config/app.global.json config/app.local.json
//! ```

pub mod config;
pub mod framework;
pub mod lifecycle;
pub mod services;
