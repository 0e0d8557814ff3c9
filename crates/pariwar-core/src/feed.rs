//! [`SnapshotFeed`] — the publishing side of the live query.
//!
//! Backends own one feed per collection and push a full [`Snapshot`] after
//! every write. Consumers hold [`Subscription`]s. The feed keeps only the
//! latest state: a slow consumer may skip intermediate snapshots but always
//! observes the newest one, which is sufficient because every snapshot is the
//! complete result set.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;

use crate::{snapshot::Snapshot, subscription::Subscription};

/// A failure of the live query itself (setup or mid-stream).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct SubscriptionError(pub String);

/// One item delivered to a subscriber.
#[derive(Debug, Clone)]
pub enum SnapshotEvent {
  Snapshot(Arc<Snapshot>),
  Failed(SubscriptionError),
}

/// The value held in the watch channel.
#[derive(Debug, Clone, Default)]
pub(crate) struct FeedState {
  /// Highest snapshot version published so far.
  pub(crate) version: Option<u64>,
  /// `None` until the first snapshot or failure.
  pub(crate) event:   Option<SnapshotEvent>,
}

/// Publisher half of the live query.
#[derive(Debug)]
pub struct SnapshotFeed {
  tx: watch::Sender<FeedState>,
}

impl Default for SnapshotFeed {
  fn default() -> Self { Self::new() }
}

impl SnapshotFeed {
  /// A feed with nothing published yet; subscribers wait for the first event.
  pub fn new() -> Self {
    let (tx, _rx) = watch::channel(FeedState::default());
    Self { tx }
  }

  /// Publish `snapshot` unless a snapshot with an equal or higher version was
  /// already published. Returns whether the snapshot was accepted.
  pub fn publish(&self, snapshot: Snapshot) -> bool {
    let accepted = self.tx.send_if_modified(|state| {
      if let Some(seen) = state.version
        && snapshot.version <= seen
      {
        return false;
      }
      state.version = Some(snapshot.version);
      state.event = Some(SnapshotEvent::Snapshot(Arc::new(snapshot)));
      true
    });
    if !accepted {
      tracing::debug!("dropping stale snapshot");
    }
    accepted
  }

  /// Tell every subscriber that the live query failed.
  pub fn fail(&self, message: impl Into<String>) {
    let error = SubscriptionError(message.into());
    self.tx.send_modify(|state| {
      state.event = Some(SnapshotEvent::Failed(error));
    });
  }

  /// Open a new subscription. Its first item is the current state, if any.
  pub fn subscribe(&self) -> Subscription { Subscription::new(self.tx.subscribe()) }

  /// Resolves once every subscription has been dropped.
  pub async fn closed(&self) { self.tx.closed().await }

  /// Number of live subscriptions.
  pub fn subscriber_count(&self) -> usize { self.tx.receiver_count() }

  /// The latest published snapshot, if the feed currently holds one.
  pub fn latest(&self) -> Option<Arc<Snapshot>> {
    match &self.tx.borrow().event {
      Some(SnapshotEvent::Snapshot(s)) => Some(Arc::clone(s)),
      _ => None,
    }
  }
}
