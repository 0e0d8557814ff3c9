//! The `RecordStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `pariwar-store-sqlite`)
//! and by remote clients (the HTTP client in `pariwar-cli`). Higher layers
//! depend on this abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  record::{Record, RecordFields},
  snapshot::Snapshot,
  subscription::Subscription,
};

/// Abstraction over the document store holding the record collection.
///
/// Every write is followed, eventually, by a new [`Snapshot`] on all open
/// subscriptions. Callers never patch their own view of the collection; they
/// wait for the snapshot.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait RecordStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a new record; the store assigns its identifier.
  fn create(
    &self,
    fields: RecordFields,
  ) -> impl Future<Output = Result<Record, Self::Error>> + Send + '_;

  /// Retrieve a record by identifier. Returns `None` if not found.
  fn get(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Record>, Self::Error>> + Send + '_;

  /// Overwrite every field of an existing record.
  ///
  /// Returns `None` if no record has this identifier; nothing is created.
  fn update(
    &self,
    id: Uuid,
    fields: RecordFields,
  ) -> impl Future<Output = Result<Option<Record>, Self::Error>> + Send + '_;

  /// Remove a record. Returns `false` if it did not exist.
  fn delete(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// The current contents of the collection, in display order.
  fn list(&self) -> impl Future<Output = Result<Snapshot, Self::Error>> + Send + '_;

  /// Open a live query over the collection.
  fn subscribe(
    &self,
  ) -> impl Future<Output = Result<Subscription, Self::Error>> + Send + '_;
}
