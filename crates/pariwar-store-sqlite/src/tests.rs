//! Integration tests for `SqliteStore` against an in-memory database.

use pariwar_core::{
  Error as CoreError,
  feed::SnapshotEvent,
  record::{Field, RecordFields},
  snapshot::Snapshot,
  store::RecordStore,
  subscription::Subscription,
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn next_snapshot(sub: &mut Subscription) -> std::sync::Arc<Snapshot> {
  match sub.next().await.expect("feed open") {
    SnapshotEvent::Snapshot(s) => s,
    SnapshotEvent::Failed(e) => panic!("subscription failed: {e}"),
  }
}

fn serials(snapshot: &Snapshot) -> Vec<&str> {
  snapshot
    .records
    .iter()
    .map(|r| r.fields.serial_number.as_str())
    .collect()
}

// ─── Create / get ────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_record() {
  let s = store().await;

  let mut fields = RecordFields::new("1", "Ram");
  fields.address = "Pokhara".into();
  fields.dob = "२०४५/०३/१२".into();

  let record = s.create(fields.clone()).await.unwrap();
  assert_eq!(record.fields, fields);

  let fetched = s.get(record.id).await.unwrap().unwrap();
  assert_eq!(fetched, record);
}

#[tokio::test]
async fn create_assigns_distinct_ids() {
  let s = store().await;
  let a = s.create(RecordFields::new("1", "Ram")).await.unwrap();
  let b = s.create(RecordFields::new("1", "Ram")).await.unwrap();
  assert_ne!(a.id, b.id);
  assert_eq!(s.list().await.unwrap().len(), 2);
}

#[tokio::test]
async fn create_rejects_missing_required_fields() {
  let s = store().await;
  let err = s.create(RecordFields::new("", "Ram")).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(CoreError::MissingField(Field::SerialNumber))
  ));
  assert!(s.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn get_missing_returns_none() {
  let s = store().await;
  assert!(s.get(Uuid::new_v4()).await.unwrap().is_none());
}

// ─── Ordering ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_orders_serial_numbers_lexicographically() {
  let s = store().await;
  for serial in ["2", "10", "1"] {
    s.create(RecordFields::new(serial, "x")).await.unwrap();
  }
  let snapshot = s.list().await.unwrap();
  assert_eq!(serials(&snapshot), ["1", "10", "2"]);
}

// ─── Update ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn update_overwrites_every_field() {
  let s = store().await;
  let mut original = RecordFields::new("3", "Sita");
  original.father_name = "Janak".into();
  original.occupation = "Priest".into();
  let record = s.create(original).await.unwrap();

  let mut edited = record.fields.clone();
  edited.occupation = "Farmer".into();
  let updated = s.update(record.id, edited.clone()).await.unwrap().unwrap();
  assert_eq!(updated.id, record.id);

  let fetched = s.get(record.id).await.unwrap().unwrap();
  assert_eq!(fetched.fields, edited);
  assert_eq!(fetched.fields.father_name, "Janak");
}

#[tokio::test]
async fn update_with_empty_optionals_clears_them() {
  let s = store().await;
  let mut original = RecordFields::new("4", "Gita");
  original.address = "Lalitpur".into();
  let record = s.create(original).await.unwrap();

  s.update(record.id, RecordFields::new("4", "Gita"))
    .await
    .unwrap()
    .unwrap();
  let fetched = s.get(record.id).await.unwrap().unwrap();
  assert_eq!(fetched.fields.address, "");
}

#[tokio::test]
async fn update_missing_returns_none_and_creates_nothing() {
  let s = store().await;
  let result = s
    .update(Uuid::new_v4(), RecordFields::new("1", "Ghost"))
    .await
    .unwrap();
  assert!(result.is_none());
  assert!(s.list().await.unwrap().is_empty());
}

// ─── Delete ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_removes_record() {
  let s = store().await;
  let record = s.create(RecordFields::new("1", "Ram")).await.unwrap();
  assert!(s.delete(record.id).await.unwrap());
  assert!(s.get(record.id).await.unwrap().is_none());
}

#[tokio::test]
async fn delete_missing_returns_false() {
  let s = store().await;
  assert!(!s.delete(Uuid::new_v4()).await.unwrap());
}

// ─── Live query ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn subscription_starts_with_current_contents() {
  let s = store().await;
  s.create(RecordFields::new("1", "Ram")).await.unwrap();

  let mut sub = s.subscribe().await.unwrap();
  let snapshot = next_snapshot(&mut sub).await;
  assert_eq!(serials(&snapshot), ["1"]);
}

#[tokio::test]
async fn every_write_produces_a_newer_snapshot() {
  let s = store().await;
  let mut sub = s.subscribe().await.unwrap();
  let empty = next_snapshot(&mut sub).await;
  assert!(empty.is_empty());

  let ram = s.create(RecordFields::new("1", "Ram")).await.unwrap();
  let one = next_snapshot(&mut sub).await;
  assert!(one.supersedes(&empty));
  assert_eq!(serials(&one), ["1"]);

  s.create(RecordFields::new("2", "Shyam")).await.unwrap();
  let two = next_snapshot(&mut sub).await;
  assert_eq!(serials(&two), ["1", "2"]);

  s.delete(ram.id).await.unwrap();
  let after = next_snapshot(&mut sub).await;
  assert_eq!(serials(&after), ["2"]);
  assert!(after.supersedes(&two));
}

#[tokio::test]
async fn no_op_delete_publishes_nothing() {
  let s = store().await;
  let before = s.list().await.unwrap();
  s.delete(Uuid::new_v4()).await.unwrap();
  let after = s.list().await.unwrap();
  assert_eq!(before.version, after.version);
}

#[tokio::test]
async fn snapshot_matches_list_after_writes() {
  let s = store().await;
  let mut sub = s.subscribe().await.unwrap();
  let a = s.create(RecordFields::new("b", "A")).await.unwrap();
  s.create(RecordFields::new("a", "B")).await.unwrap();
  s.update(a.id, RecordFields::new("c", "A")).await.unwrap();

  let mut latest = next_snapshot(&mut sub).await;
  let listed = s.list().await.unwrap();
  while latest.version < listed.version {
    latest = next_snapshot(&mut sub).await;
  }
  assert_eq!(*latest, listed);
  assert_eq!(serials(&listed), ["a", "c"]);
}

#[tokio::test]
async fn clones_share_one_feed() {
  let s = store().await;
  let other = s.clone();
  let mut sub = s.subscribe().await.unwrap();
  next_snapshot(&mut sub).await;

  other.create(RecordFields::new("9", "Hari")).await.unwrap();
  let snapshot = next_snapshot(&mut sub).await;
  assert_eq!(serials(&snapshot), ["9"]);
}
