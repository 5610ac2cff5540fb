//! Request-id middleware
//!
//! Reads `x-request-id` from the incoming metadata, or mints a UUIDv4 when
//! it is missing or empty. The id is added to the request context as
//! `request_id` and echoed in the response metadata, byte for byte when it
//! came from the caller. The middleware never fails a call on its own
//! account.

use crate::constants::{REQUEST_ID_ATTR, REQUEST_ID_HEADER};
use crate::context::Context;
use futures::future::BoxFuture;
use http::{HeaderMap, HeaderValue, Request, Response};
use std::task::{Context as TaskContext, Poll};
use tower::{Layer, Service};
use tracing::error;
use uuid::Uuid;
use webmods_domain::value_objects::Attr;

/// Layer applying [`RequestIdService`]
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestIdLayer;

impl RequestIdLayer {
    /// Create the layer
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdService { inner }
    }
}

/// Service seeding the request context with a correlation id
#[derive(Debug, Clone)]
pub struct RequestIdService<S> {
    inner: S,
}

/// Inbound id, or a fresh UUIDv4 when absent or empty
pub fn extract_request_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for RequestIdService<S>
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
        // The clone may not be ready; call the instance that was polled
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        let inbound = req
            .headers()
            .get(REQUEST_ID_HEADER)
            .filter(|value| !value.is_empty())
            .cloned();
        let request_id = extract_request_id(req.headers());
        let ctx = req
            .extensions()
            .get::<Context>()
            .cloned()
            .unwrap_or_else(Context::current)
            .with_attrs([Attr::string(REQUEST_ID_ATTR, request_id.as_str())]);
        req.extensions_mut().insert(ctx.clone());

        Box::pin(async move {
            let mut response = ctx.clone().scope(inner.call(req)).await?;
            let echoed = match inbound {
                Some(value) => Ok(value),
                None => HeaderValue::from_str(&request_id),
            };
            match echoed {
                Ok(value) => {
                    response.headers_mut().insert(REQUEST_ID_HEADER, value);
                }
                Err(e) => ctx.sync_scope(|| {
                    error!(error = %e, "Failed to set request id in response metadata");
                }),
            }
            Ok(response)
        })
    }
}
