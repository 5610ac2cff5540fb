//! Tests for the in-memory KV client

use futures::StreamExt;
use std::time::Duration;
use webmods_domain::ports::{KvClient, KvMessage};
use webmods_providers::kv::InMemoryKvClient;

#[tokio::test]
async fn test_set_get_del() {
    let kv = InMemoryKvClient::new();

    assert_eq!(kv.get("missing").await.unwrap(), None);

    kv.set("k", b"v1", None).await.unwrap();
    assert_eq!(kv.get("k").await.unwrap(), Some(b"v1".to_vec()));

    kv.set("k", b"v2", None).await.unwrap();
    assert_eq!(kv.get("k").await.unwrap(), Some(b"v2".to_vec()));

    assert!(kv.del("k").await.unwrap());
    assert!(!kv.del("k").await.unwrap());
    assert_eq!(kv.get("k").await.unwrap(), None);
}

#[tokio::test(start_paused = true)]
async fn test_ttl_expires_entries() {
    let kv = InMemoryKvClient::new();
    kv.set("short", b"x", Some(Duration::from_secs(5)))
        .await
        .unwrap();
    kv.set("forever", b"y", Some(Duration::ZERO)).await.unwrap();

    tokio::time::advance(Duration::from_secs(4)).await;
    assert_eq!(kv.get("short").await.unwrap(), Some(b"x".to_vec()));

    tokio::time::advance(Duration::from_secs(2)).await;
    assert_eq!(kv.get("short").await.unwrap(), None);
    assert_eq!(kv.get("forever").await.unwrap(), Some(b"y".to_vec()));
    assert_eq!(kv.len(), 1);
}

#[tokio::test]
async fn test_clones_share_state() {
    let kv = InMemoryKvClient::new();
    let peer = kv.clone();

    kv.set("shared", b"1", None).await.unwrap();
    assert_eq!(peer.get("shared").await.unwrap(), Some(b"1".to_vec()));
}

#[tokio::test]
async fn test_subscribe_filters_by_channel() {
    let kv = InMemoryKvClient::new();
    let mut stream = kv.subscribe("events").await.unwrap();
    assert_eq!(kv.subscriber_count(), 1);

    kv.publish("other", "ignored").await.unwrap();
    kv.publish("events", "user:1").await.unwrap();

    let msg = tokio::time::timeout(Duration::from_secs(1), stream.next())
        .await
        .expect("message should arrive")
        .expect("stream should stay open");
    assert_eq!(msg, KvMessage::new("events", "user:1"));
}

#[tokio::test]
async fn test_publish_without_subscribers_succeeds() {
    let kv = InMemoryKvClient::new();
    kv.publish("nobody", "hello").await.unwrap();
}

#[tokio::test]
async fn test_unavailable_store_fails_with_transport_error() {
    let kv = InMemoryKvClient::new();
    kv.set_available(false);

    assert!(kv.get("k").await.unwrap_err().is_transport());
    assert!(kv.set("k", b"v", None).await.unwrap_err().is_transport());
    assert!(kv.publish("c", "p").await.unwrap_err().is_transport());
    assert!(kv.subscribe("c").await.is_err());

    kv.set_available(true);
    kv.set("k", b"v", None).await.unwrap();
}

#[test]
fn test_provider_name() {
    assert_eq!(InMemoryKvClient::new().provider_name(), "memory");
}
