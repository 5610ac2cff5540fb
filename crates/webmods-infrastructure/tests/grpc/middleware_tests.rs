//! Request-id and call-logging middleware tests

use crate::test_utils::{CapturedLogs, capture_handler};
use http::{HeaderValue, Request, Response};
use std::convert::Infallible;
use tower::{ServiceBuilder, ServiceExt, service_fn};
use tracing::{Level, info};
use uuid::Uuid;
use webmods_domain::Attr;
use webmods_infrastructure::context::Context;
use webmods_infrastructure::grpc::{
    GrpcLogLayer, RequestIdLayer, extract_request_id, request_context,
};
use webmods_infrastructure::logging::{LogFormat, subscriber};

const METHOD_PATH: &str = "/helloworld.Greeter/SayHello";

fn request(request_id: Option<&str>) -> Request<()> {
    let mut builder = Request::builder().uri(METHOD_PATH);
    if let Some(id) = request_id {
        builder = builder.header("x-request-id", id);
    }
    builder.body(()).unwrap()
}

/// Run one call through both layers with a handler that logs and reports
/// the attribute keys of its context
async fn call(req: Request<()>, status: Option<&'static str>) -> (Response<Vec<String>>, CapturedLogs) {
    let (handler, logs) = capture_handler(LogFormat::Json, Level::INFO);
    let _guard = tracing::subscriber::set_default(subscriber(handler));

    let service = ServiceBuilder::new()
        .layer(RequestIdLayer::new())
        .layer(GrpcLogLayer::new())
        .service(service_fn(move |req: Request<()>| async move {
            let ctx = req
                .extensions()
                .get::<Context>()
                .cloned()
                .expect("middleware stores the context");
            let ctx = ctx.with_attrs([Attr::string("user_id", "u1")]);
            ctx.sync_scope(|| info!("handling"));

            let keys: Vec<String> = Context::current()
                .attrs()
                .iter()
                .map(|a| a.key.clone())
                .collect();
            let mut response = Response::new(keys);
            if let Some(status) = status {
                response
                    .headers_mut()
                    .insert("grpc-status", status.parse().unwrap());
            }
            Ok::<_, Infallible>(response)
        }));

    let response = service.oneshot(req).await.unwrap();
    (response, logs)
}

#[tokio::test]
async fn test_inbound_request_id_is_echoed_and_logged() {
    let (response, logs) = call(request(Some("req-42")), None).await;

    assert_eq!(response.headers()["x-request-id"], "req-42");
    assert_eq!(response.body(), &vec!["request_id".to_string()]);

    let records = logs.json_lines();
    let messages: Vec<&str> = records.iter().map(|r| r["msg"].as_str().unwrap()).collect();
    assert_eq!(messages, vec!["started call", "handling", "finished call"]);
    assert!(records.iter().all(|r| r["request_id"] == "req-42"));
    assert_eq!(records[1]["user_id"], "u1");
}

#[tokio::test]
async fn test_call_fields_are_logged() {
    let (_, logs) = call(request(Some("req-1")), None).await;

    let records = logs.json_lines();
    for record in &records {
        assert_eq!(record["grpc.component"], "server");
        assert_eq!(record["grpc.service"], "helloworld.Greeter");
        assert_eq!(record["grpc.method"], "SayHello");
        assert_eq!(record["grpc.method_type"], "unary");
        assert_eq!(record["protocol"], "grpc");
    }

    let finished = records.last().unwrap();
    assert_eq!(finished["level"], "INFO");
    assert_eq!(finished["grpc.code"], "OK");
    assert!(finished["grpc.time_ms"].as_f64().unwrap() >= 0.0);
}

#[tokio::test]
async fn test_non_utf8_request_id_is_echoed_verbatim() {
    let inbound = HeaderValue::from_bytes(b"req-\xe9t\xe9").unwrap();
    let req = Request::builder()
        .uri(METHOD_PATH)
        .header("x-request-id", inbound.clone())
        .body(())
        .unwrap();

    let (response, logs) = call(req, None).await;

    assert_eq!(response.headers()["x-request-id"], inbound);
    assert!(logs
        .json_lines()
        .iter()
        .all(|r| r["request_id"] == "req-\u{fffd}t\u{fffd}"));
}

#[tokio::test]
async fn test_missing_request_id_is_generated() {
    let (response, logs) = call(request(None), None).await;

    let id = response.headers()["x-request-id"].to_str().unwrap().to_string();
    assert_eq!(id.len(), 36);
    assert!(Uuid::parse_str(&id).is_ok());
    assert!(logs.json_lines().iter().all(|r| r["request_id"] == id.as_str()));
}

#[tokio::test]
async fn test_empty_request_id_is_generated() {
    let (response, _) = call(request(Some("")), None).await;

    let id = response.headers()["x-request-id"].to_str().unwrap();
    assert!(Uuid::parse_str(id).is_ok());
}

#[tokio::test]
async fn test_client_status_finishes_at_info() {
    let (_, logs) = call(request(Some("req-5")), Some("5")).await;

    let finished = logs.json_lines().pop().unwrap();
    assert_eq!(finished["level"], "INFO");
    assert_eq!(finished["grpc.code"], "NotFound");
}

#[tokio::test]
async fn test_server_fault_finishes_at_error() {
    let (_, logs) = call(request(Some("req-13")), Some("13")).await;

    let finished = logs.json_lines().pop().unwrap();
    assert_eq!(finished["level"], "ERROR");
    assert_eq!(finished["grpc.code"], "Internal");
}

#[tokio::test]
async fn test_retry_class_status_finishes_at_warn() {
    let (_, logs) = call(request(Some("req-4")), Some("4")).await;

    let finished = logs.json_lines().pop().unwrap();
    assert_eq!(finished["level"], "WARN");
    assert_eq!(finished["grpc.code"], "DeadlineExceeded");
}

#[tokio::test]
async fn test_failed_service_is_logged_as_unknown() {
    let (handler, logs) = capture_handler(LogFormat::Json, Level::INFO);
    let _guard = tracing::subscriber::set_default(subscriber(handler));

    let service = ServiceBuilder::new()
        .layer(RequestIdLayer::new())
        .layer(GrpcLogLayer::new())
        .service(service_fn(|_req: Request<()>| async {
            Err::<Response<()>, _>("connection reset")
        }));

    let err = service.oneshot(request(Some("req-9"))).await.unwrap_err();
    assert_eq!(err, "connection reset");

    let finished = logs.json_lines().pop().unwrap();
    assert_eq!(finished["level"], "ERROR");
    assert_eq!(finished["grpc.code"], "Unknown");
    assert_eq!(finished["request_id"], "req-9");
}

#[test]
fn test_extract_request_id() {
    let req = request(Some("abc"));
    assert_eq!(extract_request_id(req.headers()), "abc");

    let generated = extract_request_id(request(None).headers());
    assert_eq!(generated.len(), 36);
}

#[test]
fn test_request_context_reads_extensions() {
    let mut req = tonic::Request::new(());
    assert!(request_context(&req).attrs().is_empty());

    req.extensions_mut()
        .insert(Context::background().with_attrs([Attr::string("request_id", "r1")]));
    let ctx = request_context(&req);
    assert_eq!(ctx.attrs()[0].value.as_str(), Some("r1"));
}
