//! # webmods
//!
//! Building blocks for gRPC services: layered configuration, structured
//! logging with request-scoped attributes, request-id and call-logging
//! middleware, KV clients, a two-tier cache kept coherent over pub/sub, and
//! an object storage façade.
//!
//! ## Example
//!
//! ```ignore
//! use webmods::{App, Context};
//!
//! let app = App::init("api")?;
//! let ctx = Context::background();
//! let cache = app.cache(&ctx, app.kv_client()?).await?;
//! cache.set(&ctx, "greeting", "hello", Duration::from_secs(60)).await?;
//! ```
//!
//! ## Layout
//!
//! - `domain` - error type, attributes, ports
//! - `providers` - Redis and in-memory KV, local object storage
//! - `infrastructure` - config, context, logging, gRPC layers, cache

/// Domain layer - error type, value objects and ports
///
/// Re-exports from the domain crate for convenience
pub mod domain {
    pub use webmods_domain::*;
}

/// Provider layer - KV and object storage adapters
pub mod providers {
    pub use webmods_providers::*;
}

/// Infrastructure layer - config, context, logging, middleware and cache
pub mod infrastructure {
    pub use webmods_infrastructure::*;
}

mod app;

pub use app::App;

// Re-export commonly used types at the crate root
pub use domain::{Attr, AttrValue, Error, Result};
pub use infrastructure::Context;
pub use infrastructure::cache::{CacheConfig, TwoTierCache};
pub use infrastructure::config::{ConfigLoader, ConfigStore};
pub use infrastructure::grpc::{GrpcLogLayer, RequestIdLayer};
