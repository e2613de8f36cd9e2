use futures::stream;
use std::sync::{Arc, Mutex};
use std::thread;
use streamweave_math::{
  Aggregate, AggregateError, Observer, Subscription, from_iter, from_stream, max, max_by, min,
  min_by, sum, sum_at_least_one,
};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Reading {
  sensor: &'static str,
  celsius: f64,
}

fn readings() -> Vec<Reading> {
  vec![
    Reading { sensor: "attic", celsius: 31.5 },
    Reading { sensor: "cellar", celsius: 12.0 },
    Reading { sensor: "garage", celsius: 31.5 },
    Reading { sensor: "porch", celsius: 18.25 },
  ]
}

#[tokio::test]
async fn test_hottest_sensors() {
  let hottest = max_by(from_iter(readings()), |r: &Reading| r.celsius)
    .with_name("hottest")
    .into_stream()
    .single()
    .await
    .unwrap();

  let names: Vec<_> = hottest.iter().map(|r| r.sensor).collect();
  assert_eq!(names, vec!["attic", "garage"]);
}

#[tokio::test]
async fn test_coldest_sensor() {
  let coldest = min_by(from_iter(readings()), |r: &Reading| r.celsius)
    .into_stream()
    .single()
    .await
    .unwrap();
  assert_eq!(coldest, vec![readings()[1]]);
}

#[tokio::test]
async fn test_total_of_async_source() {
  let total = sum::<f64, _>(from_stream(stream::iter(readings().into_iter().map(|r| r.celsius))))
    .into_stream()
    .single()
    .await
    .unwrap();
  assert_eq!(total, 93.25);
}

#[tokio::test]
async fn test_empty_sources() {
  let zero = sum::<i32, _>(from_iter(Vec::<i32>::new())).into_stream().single().await;
  assert_eq!(zero.unwrap(), 0);

  let required = sum_at_least_one::<i32, _>(from_iter(Vec::<i32>::new()))
    .into_stream()
    .single()
    .await;
  assert!(matches!(required, Err(AggregateError::ArgumentRequired)));

  let minimum = min(from_iter(Vec::<i32>::new())).into_stream().single().await;
  assert!(matches!(minimum, Err(AggregateError::NoSuchElement)));

  let ties = max_by(from_iter(Vec::<i32>::new()), |v: &i32| *v)
    .into_stream()
    .single()
    .await;
  assert!(ties.unwrap().is_empty());
}

/// Consumer that stashes its subscription so another thread can request.
#[derive(Default)]
struct Handoff {
  subscription: Mutex<Option<Subscription>>,
  values: Mutex<Vec<i32>>,
  completions: Mutex<usize>,
}

impl Observer<i32> for Handoff {
  fn on_subscribe(&self, subscription: &Subscription) {
    *self.subscription.lock().unwrap() = Some(subscription.clone());
  }

  fn on_next(&self, value: i32) {
    self.values.lock().unwrap().push(value);
  }

  fn on_error(&self, error: AggregateError) {
    panic!("unexpected error: {error}");
  }

  fn on_complete(&self) {
    *self.completions.lock().unwrap() += 1;
  }
}

#[test]
fn test_demand_from_another_thread() {
  let consumer = Arc::new(Handoff::default());
  max(from_iter(vec![4, 8, 15, 16, 23, 42])).subscribe(consumer.clone());
  assert!(consumer.values.lock().unwrap().is_empty());

  let subscription = consumer.subscription.lock().unwrap().clone().unwrap();
  thread::spawn(move || subscription.request(1)).join().unwrap();

  assert_eq!(*consumer.values.lock().unwrap(), vec![42]);
  assert_eq!(*consumer.completions.lock().unwrap(), 1);
}
