use crate::error::AggregateError;
use crate::subscriber::{Observer, Subscription};
use std::sync::{Arc, Mutex, Once};

#[derive(Debug, Clone)]
pub(crate) enum Event<R> {
  Next(R),
  Error(AggregateError),
  Complete,
}

/// Observer that records every signal, optionally requesting on subscribe.
pub(crate) struct RecordingObserver<R> {
  events: Mutex<Vec<Event<R>>>,
  request_on_subscribe: i64,
  cancel_on_subscribe: bool,
}

impl<R: Clone + Send + 'static> RecordingObserver<R> {
  pub(crate) fn new() -> Arc<Self> {
    Self::build(0, false)
  }

  pub(crate) fn requesting(n: i64) -> Arc<Self> {
    Self::build(n, false)
  }

  pub(crate) fn cancelling() -> Arc<Self> {
    Self::build(0, true)
  }

  fn build(request_on_subscribe: i64, cancel_on_subscribe: bool) -> Arc<Self> {
    Arc::new(Self {
      events: Mutex::new(Vec::new()),
      request_on_subscribe,
      cancel_on_subscribe,
    })
  }

  pub(crate) fn events(&self) -> Vec<Event<R>> {
    self.events.lock().unwrap().clone()
  }

  pub(crate) fn values(&self) -> Vec<R> {
    self
      .events()
      .into_iter()
      .filter_map(|event| match event {
        Event::Next(value) => Some(value),
        _ => None,
      })
      .collect()
  }

  pub(crate) fn errors(&self) -> Vec<AggregateError> {
    self
      .events()
      .into_iter()
      .filter_map(|event| match event {
        Event::Error(error) => Some(error),
        _ => None,
      })
      .collect()
  }

  pub(crate) fn completions(&self) -> usize {
    self
      .events()
      .iter()
      .filter(|event| matches!(event, Event::Complete))
      .count()
  }

  /// The single value delivered, asserting it was followed by one completion.
  pub(crate) fn single_value(&self) -> R {
    let events = self.events();
    assert_eq!(events.len(), 2, "expected value then completion");
    match (&events[0], &events[1]) {
      (Event::Next(value), Event::Complete) => value.clone(),
      _ => panic!("expected value then completion"),
    }
  }

  /// The single error delivered, asserting nothing else was.
  pub(crate) fn single_error(&self) -> AggregateError {
    let events = self.events();
    assert_eq!(events.len(), 1, "expected exactly one error");
    match &events[0] {
      Event::Error(error) => error.clone(),
      _ => panic!("expected an error"),
    }
  }

  pub(crate) fn is_silent(&self) -> bool {
    self.events.lock().unwrap().is_empty()
  }
}

impl<R: Send> Observer<R> for RecordingObserver<R> {
  fn on_subscribe(&self, subscription: &Subscription) {
    if self.cancel_on_subscribe {
      subscription.cancel();
    }
    subscription.request(self.request_on_subscribe);
  }

  fn on_next(&self, value: R) {
    self.events.lock().unwrap().push(Event::Next(value));
  }

  fn on_error(&self, error: AggregateError) {
    self.events.lock().unwrap().push(Event::Error(error));
  }

  fn on_complete(&self) {
    self.events.lock().unwrap().push(Event::Complete);
  }
}

static TRACING: Once = Once::new();

pub(crate) fn init_tracing() {
  TRACING.call_once(|| {
    let _ = tracing_subscriber::fmt()
      .with_max_level(tracing::Level::TRACE)
      .with_test_writer()
      .try_init();
  });
}
