//! Snapshots: the full, ordered contents of the record collection.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::record::Record;

/// The complete result set of the live query at one point in time.
///
/// Records are ordered ascending by serial number using plain string
/// comparison, so `"10"` sorts before `"2"`. Equal serial numbers fall back to
/// identifier order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
  /// Strictly increasing per write; a consumer never replaces a snapshot by
  /// one with a lower version.
  pub version: u64,
  pub records: Vec<Record>,
}

impl Snapshot {
  /// Build a snapshot, sorting `records` into display order.
  pub fn new(version: u64, mut records: Vec<Record>) -> Self {
    records.sort_by(display_order);
    Self { version, records }
  }

  pub fn len(&self) -> usize { self.records.len() }

  pub fn is_empty(&self) -> bool { self.records.is_empty() }

  /// Whether `self` should replace `current` in a consumer.
  pub fn supersedes(&self, current: &Self) -> bool {
    self.version > current.version
  }
}

/// Serial number first (string order), identifier second.
pub fn display_order(a: &Record, b: &Record) -> Ordering {
  a.fields
    .serial_number
    .cmp(&b.fields.serial_number)
    .then_with(|| a.id.cmp(&b.id))
}
