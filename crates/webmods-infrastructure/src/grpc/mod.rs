//! gRPC server middleware
//!
//! Tower layers over `http` requests, so they compose with
//! `tonic::transport::Server::builder().layer(..)`:
//!
//! ```ignore
//! use tower::ServiceBuilder;
//! use webmods_infrastructure::grpc::{GrpcLogLayer, RequestIdLayer};
//!
//! Server::builder()
//!     .layer(ServiceBuilder::new().layer(RequestIdLayer).layer(GrpcLogLayer))
//!     .add_service(greeter)
//!     .serve(addr)
//!     .await?;
//! ```
//!
//! Each layer stores the derived [`Context`] in the request extensions and
//! installs it as the current context while the handler runs.

pub mod log;
pub mod request_id;

pub use log::{GrpcLogLayer, GrpcLogService};
pub use request_id::{RequestIdLayer, RequestIdService, extract_request_id};

use crate::context::Context;

/// Context derived by the middleware for a tonic request
pub fn request_context<T>(request: &tonic::Request<T>) -> Context {
    request
        .extensions()
        .get::<Context>()
        .cloned()
        .unwrap_or_else(Context::current)
}
