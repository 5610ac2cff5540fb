//! Call logging middleware
//!
//! Injects the gRPC call fields into the request context and logs
//! `started call` / `finished call`. The finish level follows the status
//! code: client-side outcomes at INFO, retry-class outcomes at WARN and
//! server faults at ERROR.

use crate::context::Context;
use futures::future::BoxFuture;
use http::{HeaderMap, Request, Response};
use std::task::{Context as TaskContext, Poll};
use std::time::Instant;
use tonic::Code;
use tower::{Layer, Service};
use tracing::{Level, error, info, warn};
use webmods_domain::value_objects::Attr;

/// Layer applying [`GrpcLogService`]
#[derive(Debug, Clone, Copy, Default)]
pub struct GrpcLogLayer;

impl GrpcLogLayer {
    /// Create the layer
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for GrpcLogLayer {
    type Service = GrpcLogService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        GrpcLogService { inner }
    }
}

/// Service logging the start and outcome of every call
#[derive(Debug, Clone)]
pub struct GrpcLogService<S> {
    inner: S,
}

/// Split `/pkg.Service/Method` into service and method
pub fn split_method_path(path: &str) -> (&str, &str) {
    let path = path.trim_start_matches('/');
    path.rsplit_once('/').unwrap_or(("unknown", path))
}

/// Status code carried in response metadata; `OK` when absent
pub fn response_code(headers: &HeaderMap) -> Code {
    headers
        .get("grpc-status")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<i32>().ok())
        .map_or(Code::Ok, Code::from)
}

/// Canonical status code name
pub fn code_name(code: Code) -> &'static str {
    match code {
        Code::Ok => "OK",
        Code::Cancelled => "Canceled",
        Code::Unknown => "Unknown",
        Code::InvalidArgument => "InvalidArgument",
        Code::DeadlineExceeded => "DeadlineExceeded",
        Code::NotFound => "NotFound",
        Code::AlreadyExists => "AlreadyExists",
        Code::PermissionDenied => "PermissionDenied",
        Code::ResourceExhausted => "ResourceExhausted",
        Code::FailedPrecondition => "FailedPrecondition",
        Code::Aborted => "Aborted",
        Code::OutOfRange => "OutOfRange",
        Code::Unimplemented => "Unimplemented",
        Code::Internal => "Internal",
        Code::Unavailable => "Unavailable",
        Code::DataLoss => "DataLoss",
        Code::Unauthenticated => "Unauthenticated",
    }
}

/// Level of the `finished call` record for a status code
pub fn code_level(code: Code) -> Level {
    match code {
        Code::Ok
        | Code::Cancelled
        | Code::InvalidArgument
        | Code::NotFound
        | Code::AlreadyExists
        | Code::Unauthenticated => Level::INFO,
        Code::DeadlineExceeded
        | Code::PermissionDenied
        | Code::ResourceExhausted
        | Code::FailedPrecondition
        | Code::Aborted
        | Code::OutOfRange => Level::WARN,
        Code::Unknown
        | Code::Unimplemented
        | Code::Internal
        | Code::Unavailable
        | Code::DataLoss => Level::ERROR,
    }
}

fn log_finished(code: Code, time_ms: f64) {
    let name = code_name(code);
    match code_level(code) {
        Level::ERROR => error!(grpc.code = name, grpc.time_ms = time_ms, "finished call"),
        Level::WARN => warn!(grpc.code = name, grpc.time_ms = time_ms, "finished call"),
        _ => info!(grpc.code = name, grpc.time_ms = time_ms, "finished call"),
    }
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for GrpcLogService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    ReqBody: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut TaskContext<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        let (service, method) = split_method_path(req.uri().path());
        let ctx = req
            .extensions()
            .get::<Context>()
            .cloned()
            .unwrap_or_else(Context::current)
            .with_fields([
                Attr::string("grpc.component", "server"),
                Attr::string("grpc.service", service),
                Attr::string("grpc.method", method),
                Attr::string("grpc.method_type", "unary"),
                Attr::string("protocol", "grpc"),
            ]);
        req.extensions_mut().insert(ctx.clone());

        Box::pin(ctx.scope(async move {
            let start = Instant::now();
            info!("started call");

            let result = inner.call(req).await;
            let time_ms = start.elapsed().as_secs_f64() * 1000.0;
            match &result {
                Ok(response) => log_finished(response_code(response.headers()), time_ms),
                Err(_) => log_finished(Code::Unknown, time_ms),
            }
            result
        }))
    }
}
