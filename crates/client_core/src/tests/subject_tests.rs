use super::*;
use futures::StreamExt;

#[test]
fn replay_latest_hands_last_value_to_late_observer() {
    let subject = Subject::replay_latest();
    subject.on_next(1);
    subject.on_next(2);

    let mut late = subject.subscribe();
    assert_eq!(late.values(), vec![2]);

    subject.on_next(3);
    assert_eq!(late.values(), vec![3]);
    assert_eq!(subject.value(), Some(3));
}

#[test]
fn publish_does_not_replay() {
    let subject = Subject::publish();
    subject.on_next("dropped");

    let mut observer = subject.subscribe();
    assert!(observer.values().is_empty());
    assert_eq!(subject.value(), None);

    subject.on_next("seen");
    assert_eq!(observer.values(), vec!["seen"]);
}

#[test]
fn every_observer_sees_values_in_push_order() {
    let subject = Subject::replay_latest();
    let mut first = subject.subscribe();
    let mut second = subject.subscribe();

    for value in 0..4 {
        subject.on_next(value);
    }

    assert_eq!(first.values(), vec![0, 1, 2, 3]);
    assert_eq!(second.values(), vec![0, 1, 2, 3]);
}

#[test]
fn identical_values_are_not_deduplicated() {
    let subject = Subject::replay_latest();
    let mut observer = subject.subscribe();
    subject.on_next("same");
    subject.on_next("same");
    assert_eq!(observer.values(), vec!["same", "same"]);
}

#[test]
fn completion_ends_streams_and_ignores_later_values() {
    let subject = Subject::replay_latest();
    let mut observer = subject.subscribe();
    subject.on_next(10);
    subject.on_completed();
    subject.on_next(11);

    assert_eq!(observer.values(), vec![10]);
    assert!(observer.is_terminated());

    let mut after = subject.subscribe();
    assert!(after.values().is_empty());
    assert!(after.is_terminated());
}

#[test]
fn dropped_observers_are_pruned() {
    let subject = Subject::<u8>::publish();
    let kept = subject.subscribe();
    drop(subject.subscribe());
    assert_eq!(subject.observer_count(), 1);
    drop(kept);
    subject.on_next(1);
    assert_eq!(subject.observer_count(), 0);
}

#[tokio::test]
async fn observer_is_an_async_stream() {
    let subject = Subject::replay_latest();
    let observer = subject.subscribe();
    subject.on_next('a');
    subject.on_next('b');
    subject.on_completed();

    let collected: Vec<char> = observer.collect().await;
    assert_eq!(collected, vec!['a', 'b']);
}

#[test]
fn gate_drops_triggers_before_entity() {
    let mut gate = Gate::default();
    assert_eq!(gate.fire(), None);

    gate.set_entity("update");
    assert_eq!(gate.fire(), Some("update"));
    assert_eq!(gate.fire(), Some("update"));

    gate.set_entity("newer");
    assert_eq!(gate.fire(), Some("newer"));
}

#[test]
fn undrained_observer_holds_values_until_dropped() {
    let subject = Subject::publish();
    let idle = subject.subscribe();
    for value in 0..3 {
        subject.on_next(value);
    }
    assert_eq!(subject.observer_count(), 1);

    drop(idle);
    subject.on_next(3);
    assert_eq!(subject.observer_count(), 0);
}
