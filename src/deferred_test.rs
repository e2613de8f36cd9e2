use crate::deferred::{Deferred, DeferredState};
use crate::error::{AggregateError, ComponentInfo};
use crate::subscriber::{CancelFlag, Demand, Subscription};
use crate::test_support::{Event, RecordingObserver, init_tracing};
use std::sync::{Arc, Barrier};
use std::thread;

fn coordinator<R: Clone + Send + 'static>(
  observer: &Arc<RecordingObserver<R>>,
) -> Arc<Deferred<R>> {
  init_tracing();
  Deferred::new(observer.clone(), ComponentInfo::new(None, "test"))
}

// ============================================================================
// Demand / Value Ordering
// ============================================================================

#[test]
fn test_demand_before_value_emits_on_complete() {
  let observer = RecordingObserver::new();
  let deferred = coordinator(&observer);

  deferred.request(1);
  assert_eq!(deferred.state(), DeferredState::HasRequestNoValue);
  assert!(observer.is_silent());

  deferred.complete(7);
  assert_eq!(observer.single_value(), 7);
  assert_eq!(deferred.state(), DeferredState::HasRequestHasValue);
}

#[test]
fn test_value_before_demand_is_parked() {
  let observer = RecordingObserver::new();
  let deferred = coordinator(&observer);

  deferred.complete(7);
  assert_eq!(deferred.state(), DeferredState::NoRequestHasValue);
  assert!(observer.is_silent());

  deferred.request(1);
  assert_eq!(observer.single_value(), 7);
  assert_eq!(deferred.state(), DeferredState::HasRequestHasValue);
}

#[test]
fn test_repeated_requests_emit_once() {
  let observer = RecordingObserver::new();
  let deferred = coordinator(&observer);

  deferred.request(1);
  deferred.request(3);
  deferred.complete(11);
  deferred.request(1);
  deferred.request(i64::MAX);

  assert_eq!(observer.single_value(), 11);
}

#[test]
fn test_non_positive_requests_are_ignored() {
  let observer = RecordingObserver::new();
  let deferred = coordinator(&observer);

  deferred.request(0);
  deferred.request(-5);
  assert_eq!(deferred.state(), DeferredState::NoRequestNoValue);

  deferred.complete(1);
  assert!(observer.is_silent());
  assert_eq!(deferred.state(), DeferredState::NoRequestHasValue);
}

#[test]
fn test_subscription_filters_non_positive_requests() {
  let observer = RecordingObserver::new();
  let deferred = coordinator(&observer);
  let subscription = deferred.subscription();

  deferred.complete(5);
  subscription.request(0);
  assert!(observer.is_silent());

  subscription.request(2);
  assert_eq!(observer.single_value(), 5);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_fail_bypasses_demand() {
  let observer = RecordingObserver::<i32>::new();
  let deferred = coordinator(&observer);

  deferred.fail(AggregateError::upstream(std::io::Error::other("boom")));

  assert!(observer.single_error().is_upstream());
  assert_eq!(deferred.state(), DeferredState::HasRequestHasValue);
}

#[test]
fn test_fail_drops_parked_value() {
  let observer = RecordingObserver::new();
  let deferred = coordinator(&observer);
  let value = Arc::new(());

  deferred.complete(value.clone());
  assert_eq!(Arc::strong_count(&value), 2);

  deferred.fail(AggregateError::Incomparable("late".to_string()));
  assert_eq!(Arc::strong_count(&value), 1);

  deferred.request(1);
  assert!(matches!(
    observer.single_error(),
    AggregateError::Incomparable(_)
  ));
}

#[test]
fn test_nothing_follows_an_error() {
  let observer = RecordingObserver::new();
  let deferred = coordinator(&observer);

  deferred.request(1);
  deferred.fail(AggregateError::ArgumentRequired);
  deferred.complete(3);
  deferred.fail(AggregateError::NoSuchElement);

  assert!(matches!(
    observer.single_error(),
    AggregateError::ArgumentRequired
  ));
}

#[test]
fn test_error_after_emission_is_suppressed() {
  let observer = RecordingObserver::new();
  let deferred = coordinator(&observer);

  deferred.complete(3);
  deferred.request(1);
  deferred.fail(AggregateError::NoSuchElement);

  assert_eq!(observer.single_value(), 3);
}

#[test]
fn test_complete_empty_signals_no_such_element() {
  let observer = RecordingObserver::<i32>::new();
  let deferred = coordinator(&observer);

  deferred.complete_empty();

  assert!(matches!(
    observer.single_error(),
    AggregateError::NoSuchElement
  ));
}

// ============================================================================
// Cancellation
// ============================================================================

#[test]
fn test_cancel_before_value_suppresses_emission() {
  let observer = RecordingObserver::new();
  let deferred = coordinator(&observer);

  deferred.request(1);
  deferred.cancel();
  deferred.complete(9);
  deferred.request(1);

  assert!(observer.is_silent());
  assert!(deferred.is_cancelled());
}

#[test]
fn test_cancel_releases_parked_value() {
  let observer = RecordingObserver::new();
  let deferred = coordinator(&observer);
  let value = Arc::new(());

  deferred.complete(value.clone());
  deferred.cancel();
  assert_eq!(Arc::strong_count(&value), 1);

  deferred.request(1);
  assert!(observer.is_silent());
}

#[test]
fn test_cancel_is_idempotent_and_silences_errors() {
  let observer = RecordingObserver::<i32>::new();
  let deferred = coordinator(&observer);

  deferred.cancel();
  deferred.cancel();
  deferred.fail(AggregateError::NoSuchElement);

  assert!(observer.is_silent());
}

#[test]
fn test_cancel_reaches_attached_upstream() {
  let observer = RecordingObserver::<i32>::new();
  let deferred = coordinator(&observer);
  let upstream = CancelFlag::new();

  deferred.attach_upstream(Subscription::new(upstream.clone()));
  assert!(!upstream.is_cancelled());

  deferred.subscription().cancel();
  assert!(upstream.is_cancelled());
}

#[test]
fn test_upstream_attached_after_cancel_is_cancelled() {
  let observer = RecordingObserver::<i32>::new();
  let deferred = coordinator(&observer);
  let upstream = CancelFlag::new();

  deferred.cancel();
  deferred.attach_upstream(Subscription::new(upstream.clone()));

  assert!(upstream.is_cancelled());
}

// ============================================================================
// Races
// ============================================================================

#[test]
fn test_concurrent_demand_and_value_emit_exactly_once() {
  for round in 0..2_000 {
    let observer = RecordingObserver::new();
    let deferred = coordinator(&observer);
    let barrier = Barrier::new(2);

    thread::scope(|scope| {
      scope.spawn(|| {
        barrier.wait();
        deferred.complete(round);
      });
      scope.spawn(|| {
        barrier.wait();
        deferred.request(1);
      });
    });

    assert_eq!(observer.single_value(), round, "round {round}");
  }
}

#[test]
fn test_concurrent_requests_emit_exactly_once() {
  for round in 0..500 {
    let observer = RecordingObserver::new();
    let deferred = coordinator(&observer);
    let barrier = Barrier::new(4);

    thread::scope(|scope| {
      for _ in 0..3 {
        scope.spawn(|| {
          barrier.wait();
          deferred.request(1);
        });
      }
      scope.spawn(|| {
        barrier.wait();
        deferred.complete(round);
      });
    });

    assert_eq!(observer.single_value(), round, "round {round}");
  }
}

#[test]
fn test_concurrent_cancel_never_duplicates() {
  for round in 0..1_000 {
    let observer = RecordingObserver::new();
    let deferred = coordinator(&observer);
    let barrier = Barrier::new(3);

    thread::scope(|scope| {
      scope.spawn(|| {
        barrier.wait();
        deferred.complete(round);
      });
      scope.spawn(|| {
        barrier.wait();
        deferred.request(1);
      });
      scope.spawn(|| {
        barrier.wait();
        deferred.cancel();
      });
    });

    let events = observer.events();
    assert!(events.len() <= 2, "round {round}: {events:?}");
    assert!(observer.values().len() <= 1);
    assert!(observer.completions() <= 1);
    if let Some(Event::Complete) = events.first() {
      panic!("completion before value in round {round}");
    }
  }
}
