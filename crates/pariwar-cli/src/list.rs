//! The record list: a live view of the collection.
//!
//! The displayed rows are only ever replaced wholesale by a snapshot from the
//! store. Deletes and edits are requests; their effect shows up when the next
//! snapshot arrives.

use std::sync::Arc;

use pariwar_core::{
  feed::SnapshotEvent,
  record::Record,
  snapshot::Snapshot,
  store::RecordStore,
  subscription::{Listener, Subscription},
};
use uuid::Uuid;

use crate::form::RecordForm;

/// Lifecycle of one list instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListState {
  /// Mounted, waiting for the first snapshot.
  Loading,
  Ready,
  /// The live query failed; the last rows (if any) are still shown.
  Error(String),
  Unmounted,
}

#[derive(Debug)]
pub struct RecordList {
  state:    ListState,
  /// The displayed snapshot.
  shown:    Option<Arc<Snapshot>>,
  /// Whether `shown` came from the current subscription.
  current:  bool,
  cursor:   usize,
  listener: Option<Listener>,
}

impl Default for RecordList {
  fn default() -> Self { Self::new() }
}

impl RecordList {
  pub fn new() -> Self {
    Self {
      state:    ListState::Loading,
      shown:    None,
      current:  false,
      cursor:   0,
      listener: None,
    }
  }

  // ── Lifecycle ───────────────────────────────────────────────────────────

  /// Register `handler` on `subscription` and keep its disposal handle.
  ///
  /// The handler runs on a background task; it is expected to forward events
  /// back to whoever owns this list, which then calls [`RecordList::apply`].
  ///
  /// Mounting again replaces the previous subscription. Rows stay on screen
  /// until the new subscription delivers its first snapshot, which is
  /// accepted whatever its version: a restarted server counts from zero.
  pub fn mount<F>(&mut self, subscription: Subscription, handler: F)
  where
    F: FnMut(SnapshotEvent) + Send + 'static,
  {
    self.unmount_listener();
    self.listener = Some(subscription.listen(handler));
    self.current = false;
    self.state = ListState::Loading;
  }

  /// Cancel the subscription. Afterwards [`RecordList::apply`] is a no-op.
  pub fn unmount(&mut self) {
    self.unmount_listener();
    self.state = ListState::Unmounted;
  }

  fn unmount_listener(&mut self) {
    if let Some(listener) = self.listener.take() {
      listener.dispose();
    }
  }

  pub fn is_mounted(&self) -> bool { self.state != ListState::Unmounted }

  /// Apply one event from the live query. Returns whether anything changed.
  pub fn apply(&mut self, event: SnapshotEvent) -> bool {
    if !self.is_mounted() {
      tracing::debug!("ignoring snapshot event after unmount");
      return false;
    }

    match event {
      SnapshotEvent::Snapshot(snapshot) => {
        if self.current
          && let Some(shown) = &self.shown
          && !snapshot.supersedes(shown)
        {
          return false;
        }
        self.shown = Some(snapshot);
        self.current = true;
        self.state = ListState::Ready;
        self.clamp_cursor();
        true
      }
      SnapshotEvent::Failed(e) => {
        tracing::warn!(error = %e, "live query failed");
        self.state = ListState::Error(e.to_string());
        true
      }
    }
  }

  // ── View ────────────────────────────────────────────────────────────────

  pub fn state(&self) -> &ListState { &self.state }

  pub fn records(&self) -> &[Record] {
    self
      .shown
      .as_deref()
      .map(|s| s.records.as_slice())
      .unwrap_or_default()
  }

  pub fn cursor(&self) -> usize { self.cursor }

  pub fn selected(&self) -> Option<&Record> { self.records().get(self.cursor) }

  pub fn move_down(&mut self) {
    if self.cursor + 1 < self.records().len() {
      self.cursor += 1;
    }
  }

  pub fn move_up(&mut self) { self.cursor = self.cursor.saturating_sub(1); }

  fn clamp_cursor(&mut self) {
    self.cursor = self.cursor.min(self.records().len().saturating_sub(1));
  }

  // ── Operations ──────────────────────────────────────────────────────────

  /// Open the edit surface for the selected row: a form holding a full copy
  /// of the record as currently displayed.
  pub fn edit_selected(&self) -> Option<RecordForm> {
    self.selected().map(RecordForm::edit)
  }

  /// Ask the store to delete `id`. The row stays until the next snapshot.
  ///
  /// Returns `false` when the record was already gone.
  pub async fn delete<S>(store: &S, id: Uuid) -> Result<bool, S::Error>
  where
    S: RecordStore,
  {
    let result = store.delete(id).await;
    match &result {
      Ok(true) => tracing::info!(record_id = %id, "delete requested"),
      Ok(false) => tracing::info!(record_id = %id, "record was already gone"),
      Err(e) => tracing::error!(record_id = %id, error = %e, "delete failed"),
    }
    result
  }
}

impl Drop for RecordList {
  fn drop(&mut self) { self.unmount_listener(); }
}
