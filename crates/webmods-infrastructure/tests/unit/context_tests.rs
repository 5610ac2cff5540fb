//! Request context tests

use std::time::Duration;
use webmods_domain::{Attr, Error};
use webmods_infrastructure::context::Context;

fn keys(attrs: &[Attr]) -> Vec<&str> {
    attrs.iter().map(|a| a.key.as_str()).collect()
}

#[test]
fn test_with_attrs_appends_and_keeps_parent() {
    let parent = Context::background().with_attrs([Attr::string("a", "1")]);
    let before = parent.attrs().to_vec();

    let added = vec![Attr::string("b", "2"), Attr::int("c", 3)];
    let child = parent.with_attrs(added.clone());

    let mut expected = before.clone();
    expected.extend(added);
    assert_eq!(child.attrs(), expected.as_slice());
    assert_eq!(parent.attrs(), before.as_slice());
}

#[test]
fn test_duplicate_keys_are_kept_in_order() {
    let ctx = Context::background()
        .with_attrs([Attr::string("user_id", "u1")])
        .with_attrs([Attr::string("user_id", "u2")]);
    assert_eq!(keys(ctx.attrs()), vec!["user_id", "user_id"]);
    assert_eq!(ctx.attrs()[1].value.as_str(), Some("u2"));
}

#[test]
fn test_sibling_children_are_independent() {
    let parent = Context::background().with_attrs([Attr::string("request_id", "r1")]);
    let left = parent.with_attrs([Attr::string("side", "left")]);
    let right = parent.with_attrs([Attr::string("side", "right")]);

    assert_eq!(left.attrs()[1].value.as_str(), Some("left"));
    assert_eq!(right.attrs()[1].value.as_str(), Some("right"));
    assert_eq!(parent.attrs().len(), 1);
}

#[test]
fn test_fields_are_separate_from_attrs() {
    let ctx = Context::background()
        .with_attrs([Attr::string("user_id", "u1")])
        .with_fields([Attr::string("grpc.method", "Get")]);
    assert_eq!(keys(ctx.attrs()), vec!["user_id"]);
    assert_eq!(keys(ctx.fields()), vec!["grpc.method"]);
}

#[test]
fn test_current_defaults_to_background() {
    assert!(Context::try_current().is_none());
    assert!(Context::current().attrs().is_empty());
}

#[test]
fn test_sync_scope_installs_current() {
    let ctx = Context::background().with_attrs([Attr::string("k", "v")]);
    let seen = ctx.sync_scope(|| Context::current().attrs().to_vec());
    assert_eq!(seen, vec![Attr::string("k", "v")]);
}

#[tokio::test]
async fn test_scope_installs_current_across_awaits() {
    let ctx = Context::background().with_attrs([Attr::string("k", "v")]);
    let seen = ctx
        .scope(async {
            tokio::task::yield_now().await;
            Context::current().attrs().len()
        })
        .await;
    assert_eq!(seen, 1);
    assert!(Context::try_current().is_none());
}

#[tokio::test]
async fn test_run_returns_future_result() {
    let ctx = Context::background();
    assert_eq!(ctx.run(async { Ok(5) }).await.unwrap(), 5);

    let err = ctx
        .run(async { Err::<(), _>(Error::not_found("k")) })
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_run_observes_cancellation() {
    let (ctx, token) = Context::background().with_cancel();
    let handle = tokio::spawn({
        let ctx = ctx.clone();
        async move {
            ctx.run(async {
                std::future::pending::<()>().await;
                Ok(())
            })
            .await
        }
    });

    token.cancel();
    let err = handle.await.unwrap().unwrap_err();
    assert!(matches!(err, Error::Cancelled));
    assert!(ctx.is_cancelled());

    // Already-cancelled contexts short-circuit
    let err = ctx.run(async { Ok(()) }).await.unwrap_err();
    assert!(matches!(err, Error::Cancelled));
}

#[tokio::test(start_paused = true)]
async fn test_run_observes_deadline() {
    let ctx = Context::background().with_timeout(Duration::from_millis(50));
    let err = ctx
        .run(async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(())
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::DeadlineExceeded));
    assert!(matches!(ctx.err(), Some(Error::DeadlineExceeded)));
}

#[test]
fn test_parent_cancellation_reaches_children() {
    let (parent, token) = Context::background().with_cancel();
    let (child, _child_token) = parent.with_attrs([Attr::bool("x", true)]).with_cancel();

    assert!(child.err().is_none());
    token.cancel();
    assert!(child.is_cancelled());
    assert!(matches!(child.err(), Some(Error::Cancelled)));
}

#[test]
fn test_child_cancellation_does_not_reach_parent() {
    let parent = Context::background();
    let (_child, token) = parent.with_cancel();
    token.cancel();
    assert!(!parent.is_cancelled());
}
