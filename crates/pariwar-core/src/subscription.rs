//! [`Subscription`] and [`Listener`] — the consuming side of the live query.
//!
//! A subscription is a lazy, non-restartable sequence of [`SnapshotEvent`]s.
//! It can be polled directly with [`Subscription::next`], or handed a callback
//! with [`Subscription::listen`], which returns the matching disposal handle.

use tokio::{sync::watch, task::JoinHandle};

use crate::feed::{FeedState, SnapshotEvent};

/// A live query over the record collection.
#[derive(Debug)]
pub struct Subscription {
  rx:     watch::Receiver<FeedState>,
  primed: bool,
}

impl Subscription {
  pub(crate) fn new(rx: watch::Receiver<FeedState>) -> Self {
    Self { rx, primed: false }
  }

  /// Wait for the next event.
  ///
  /// The first call yields the feed's current state immediately when there is
  /// one. Returns `None` once the publishing side has gone away.
  pub async fn next(&mut self) -> Option<SnapshotEvent> {
    loop {
      if self.primed && self.rx.changed().await.is_err() {
        return None;
      }
      self.primed = true;
      if let Some(event) = self.rx.borrow_and_update().event.clone() {
        return Some(event);
      }
    }
  }

  /// Deliver every event to `handler` on a background task.
  ///
  /// Must be called from within a tokio runtime. Dropping or disposing the
  /// returned [`Listener`] stops delivery.
  pub fn listen<F>(mut self, mut handler: F) -> Listener
  where
    F: FnMut(SnapshotEvent) + Send + 'static,
  {
    let task = tokio::spawn(async move {
      while let Some(event) = self.next().await {
        handler(event);
      }
      tracing::debug!("snapshot feed closed");
    });
    Listener { task: Some(task) }
  }
}

/// Disposal handle for a [`Subscription::listen`] registration.
///
/// Teardown happens exactly once: either through [`Listener::dispose`], which
/// consumes the handle, or on drop.
#[derive(Debug)]
pub struct Listener {
  task: Option<JoinHandle<()>>,
}

impl Listener {
  /// Stop delivering events.
  pub fn dispose(mut self) { self.teardown(); }

  fn teardown(&mut self) {
    if let Some(task) = self.task.take() {
      task.abort();
    }
  }
}

impl Drop for Listener {
  fn drop(&mut self) { self.teardown(); }
}

#[cfg(test)]
mod tests {
  use std::sync::{Arc, Mutex};

  use super::*;
  use crate::{feed::SnapshotFeed, snapshot::Snapshot};

  fn version(event: &SnapshotEvent) -> Option<u64> {
    match event {
      SnapshotEvent::Snapshot(s) => Some(s.version),
      SnapshotEvent::Failed(_) => None,
    }
  }

  #[tokio::test]
  async fn first_next_yields_current_snapshot() {
    let feed = SnapshotFeed::new();
    feed.publish(Snapshot::new(1, vec![]));

    let mut sub = feed.subscribe();
    let event = sub.next().await.unwrap();
    assert_eq!(version(&event), Some(1));
  }

  #[tokio::test]
  async fn next_waits_for_first_publication() {
    let feed = SnapshotFeed::new();
    let mut sub = feed.subscribe();

    let waiter = tokio::spawn(async move { sub.next().await });
    tokio::task::yield_now().await;
    feed.publish(Snapshot::new(7, vec![]));

    let event = waiter.await.unwrap().unwrap();
    assert_eq!(version(&event), Some(7));
  }

  #[tokio::test]
  async fn failures_are_delivered() {
    let feed = SnapshotFeed::new();
    let mut sub = feed.subscribe();
    feed.fail("boom");

    match sub.next().await.unwrap() {
      SnapshotEvent::Failed(e) => assert_eq!(e.to_string(), "boom"),
      SnapshotEvent::Snapshot(_) => panic!("expected failure"),
    }
  }

  #[tokio::test]
  async fn ends_when_feed_is_dropped() {
    let feed = SnapshotFeed::new();
    let mut sub = feed.subscribe();
    feed.publish(Snapshot::new(1, vec![]));
    drop(feed);

    assert!(sub.next().await.is_some());
    assert!(sub.next().await.is_none());
  }

  #[tokio::test]
  async fn dropping_subscription_closes_feed() {
    let feed = SnapshotFeed::new();
    let sub = feed.subscribe();
    assert_eq!(feed.subscriber_count(), 1);
    drop(sub);
    feed.closed().await;
    assert_eq!(feed.subscriber_count(), 0);
  }

  #[tokio::test]
  async fn disposed_listener_receives_nothing_further() {
    let feed = SnapshotFeed::new();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&seen);
    let listener = feed.subscribe().listen(move |event| {
      sink.lock().unwrap().push(version(&event));
    });

    feed.publish(Snapshot::new(1, vec![]));
    tokio::task::yield_now().await;
    assert_eq!(*seen.lock().unwrap(), vec![Some(1)]);

    listener.dispose();
    feed.publish(Snapshot::new(2, vec![]));
    tokio::task::yield_now().await;
    tokio::task::yield_now().await;
    assert_eq!(*seen.lock().unwrap(), vec![Some(1)]);
  }
}
