use super::*;
use crate::subject::Subject;
use std::time::Duration;
use tokio::sync::oneshot;

#[tokio::test]
async fn newer_work_invalidates_older_work() {
    let scope = TaskScope::default();
    let output = Subject::replay_latest();
    let mut observer = output.subscribe();

    let (first_tx, first_rx) = oneshot::channel::<()>();
    let first_out = output.clone();
    assert!(scope.switch("fetch", move |guard| async move {
        let _ = first_rx.await;
        guard.emit_if_current(|| first_out.on_next("first"));
    }));

    let second_out = output.clone();
    assert!(scope.switch("fetch", move |guard| async move {
        guard.emit_if_current(|| second_out.on_next("second"));
    }));

    let _ = first_tx.send(());
    let value = tokio::time::timeout(Duration::from_secs(1), futures::StreamExt::next(&mut observer))
        .await
        .expect("emission");
    assert_eq!(value, Some("second"));

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(observer.values().is_empty());
}

#[tokio::test]
async fn keys_are_independent() {
    let scope = TaskScope::default();
    let output = Subject::publish();
    let mut observer = output.subscribe();

    for key in ["a", "b"] {
        let out = output.clone();
        scope.switch(key, move |guard| async move {
            guard.emit_if_current(|| out.on_next(key));
        });
    }

    let mut seen = Vec::new();
    for _ in 0..2 {
        let value =
            tokio::time::timeout(Duration::from_secs(1), futures::StreamExt::next(&mut observer))
                .await
                .expect("emission");
        seen.extend(value);
    }
    seen.sort_unstable();
    assert_eq!(seen, vec!["a", "b"]);
}

#[tokio::test]
async fn destroyed_scope_rejects_work_and_stale_guards() {
    let scope = TaskScope::default();
    let (release_tx, release_rx) = oneshot::channel::<()>();
    let (guard_tx, guard_rx) = oneshot::channel::<bool>();

    scope.switch("fetch", move |guard| async move {
        let _ = release_rx.await;
        let _ = guard_tx.send(guard.is_current());
    });
    assert!(scope.is_in_flight("fetch"));

    assert!(scope.destroy());
    assert!(!scope.destroy());
    assert!(scope.is_destroyed());
    assert!(!scope.switch("fetch", |_| async {}));

    let _ = release_tx.send(());
    // The aborted task never reports back.
    assert!(guard_rx.await.is_err());
}

#[tokio::test]
async fn cancel_invalidates_work_without_replacing_it() {
    let scope = TaskScope::default();
    let (release_tx, release_rx) = oneshot::channel::<()>();
    let (guard_tx, guard_rx) = oneshot::channel::<bool>();

    scope.switch("refresh", move |guard| async move {
        let _ = release_rx.await;
        let _ = guard_tx.send(guard.is_current());
    });
    scope.cancel("refresh");
    scope.cancel("unknown");

    assert!(!scope.is_in_flight("refresh"));
    assert!(!scope.is_destroyed());
    let _ = release_tx.send(());
    assert!(guard_rx.await.is_err());
    assert!(scope.switch("refresh", |_| async {}));
}

#[test]
fn switch_without_runtime_is_refused() {
    let scope = TaskScope::default();
    assert!(!scope.switch("fetch", |_| async {}));
    assert!(!scope.is_in_flight("fetch"));
}
