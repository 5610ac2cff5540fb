//! Tests for events flowing through the tracing layer

use crate::test_utils::capture_handler;
use tracing::{Level, info, warn};
use uuid::Uuid;
use webmods_domain::Attr;
use webmods_infrastructure::context::Context;
use webmods_infrastructure::logging::{LogFormat, subscriber};

#[test]
fn test_handler_attrs_appear_in_json_records() {
    let (handler, logs) = capture_handler(LogFormat::Json, Level::INFO);
    let request_id = Uuid::new_v4().to_string();

    tracing::subscriber::with_default(subscriber(handler), || {
        let ctx = Context::background()
            .with_attrs([Attr::string("request_id", request_id.as_str())])
            .with_attrs([Attr::string("user_id", "u1")]);
        ctx.sync_scope(|| info!("user loaded"));
    });

    let records = logs.json_lines();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record["msg"], "user loaded");
    assert_eq!(record["level"], "INFO");
    assert_eq!(record["request_id"], request_id.as_str());
    assert_eq!(record["user_id"], "u1");
    assert_eq!(record["cmd"], "test-cmd");
    assert_eq!(record["hostname"], "test-host");
    assert!(record["time"].is_string());
}

#[test]
fn test_event_fields_are_typed() {
    let (handler, logs) = capture_handler(LogFormat::Json, Level::INFO);

    tracing::subscriber::with_default(subscriber(handler), || {
        warn!(
            count = 3_i64,
            size = 7_u64,
            ratio = 0.5,
            ok = false,
            name = "x",
            "typed fields"
        );
    });

    let record = &logs.json_lines()[0];
    assert_eq!(record["level"], "WARN");
    assert_eq!(record["count"], 3);
    assert_eq!(record["size"], 7);
    assert_eq!(record["ratio"], 0.5);
    assert_eq!(record["ok"], false);
    assert_eq!(record["name"], "x");
}

#[test]
fn test_events_outside_a_scope_carry_only_process_fields() {
    let (handler, logs) = capture_handler(LogFormat::Json, Level::INFO);

    tracing::subscriber::with_default(subscriber(handler), || info!("no request"));

    let record = logs.json_lines().remove(0);
    let keys: Vec<String> = record.as_object().unwrap().keys().cloned().collect();
    assert_eq!(keys, vec!["time", "level", "msg", "cmd", "hostname"]);
}

#[tokio::test]
async fn test_scope_carries_attrs_across_awaits() {
    let (handler, logs) = capture_handler(LogFormat::Json, Level::INFO);
    let _guard = tracing::subscriber::set_default(subscriber(handler));

    let ctx = Context::background().with_attrs([Attr::string("job", "reindex")]);
    ctx.scope(async {
        info!("step one");
        tokio::task::yield_now().await;
        info!("step two");
    })
    .await;

    let records = logs.json_lines();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r["job"] == "reindex"));
}
