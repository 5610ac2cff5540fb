//! # Infrastructure Layer
//!
//! Cross-cutting technical concerns shared by every webmods service.
//!
//! ## Module Categories
//!
//! ### Request Scope
//! | Module | Description |
//! |--------|-------------|
//! | [`context`] | Request context: attributes, middleware fields, cancellation |
//! | [`grpc`] | Request-id and call-logging tower layers |
//!
//! ### Configuration
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Layered yaml/json/toml files with environment overlay |
//! | [`constants`] | Centralized configuration constants |
//!
//! ### Observability
//! | Module | Description |
//! |--------|-------------|
//! | [`logging`] | Context-enriched structured logging with tracing |
//!
//! ### Data
//! | Module | Description |
//! |--------|-------------|
//! | [`cache`] | Two-tier cache with pub/sub invalidation |

pub mod cache;
pub mod config;
pub mod constants;
pub mod context;
pub mod grpc;
pub mod logging;

// Re-export commonly used types
pub use context::Context;
