//! [`SqliteStore`] — the SQLite implementation of [`RecordStore`].

use std::{
  path::Path,
  sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
  },
};

use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use pariwar_core::{
  feed::SnapshotFeed,
  record::{Record, RecordFields},
  snapshot::Snapshot,
  store::RecordStore,
  subscription::Subscription,
};

use crate::{
  Result,
  encode::{RawRecord, encode_uuid, record_params},
  schema::{RECORD_COLUMNS, SCHEMA},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A record store backed by a single SQLite file.
///
/// Cloning is cheap; the connection, the snapshot feed and the version
/// counter are all shared.
#[derive(Clone)]
pub struct SqliteStore {
  conn:    tokio_rusqlite::Connection,
  feed:    Arc<SnapshotFeed>,
  /// Version of the latest snapshot; bumped inside the write's database call.
  version: Arc<AtomicU64>,
}

/// What a write closure reports back: its own output plus the rows it touched.
type WriteOutcome<T> = (T, usize);

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn).await
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn).await
  }

  /// Number of live subscriptions on this store's feed.
  pub fn subscriber_count(&self) -> usize { self.feed.subscriber_count() }

  async fn init(conn: tokio_rusqlite::Connection) -> Result<Self> {
    let store = Self {
      conn,
      feed: Arc::new(SnapshotFeed::new()),
      version: Arc::new(AtomicU64::new(0)),
    };
    store
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;

    // Seed the feed so the first subscriber sees the collection immediately.
    let initial = store.list().await?;
    store.feed.publish(initial);
    Ok(store)
  }

  /// Run `op` and, if it touched any row, re-read the whole collection in the
  /// same database call and publish the result as the next snapshot.
  ///
  /// Performing the re-read inside the call ties each snapshot to the write
  /// that produced it, so versions follow the order writes were applied.
  async fn write<T, F>(&self, op: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&rusqlite::Connection) -> rusqlite::Result<WriteOutcome<T>>
      + Send
      + 'static,
  {
    let version = Arc::clone(&self.version);

    let (out, reread) = self
      .conn
      .call(move |conn| {
        let (out, touched) = op(conn)?;
        if touched == 0 {
          return Ok((out, None));
        }
        let v = version.fetch_add(1, Ordering::SeqCst) + 1;
        let rows = select_all(conn).map_err(|e| e.to_string());
        Ok((out, Some((v, rows))))
      })
      .await?;

    match reread {
      None => {}
      Some((v, Ok(raws))) => match decode_all(raws) {
        Ok(records) => {
          tracing::debug!(
            version = v,
            records = records.len(),
            subscribers = self.feed.subscriber_count(),
            "publishing snapshot"
          );
          self.feed.publish(Snapshot::new(v, records));
        }
        Err(e) => {
          tracing::warn!(error = %e, "could not decode snapshot after write");
          self.feed.fail(format!("snapshot decode failed: {e}"));
        }
      },
      Some((_, Err(e))) => {
        tracing::warn!(error = %e, "could not re-read collection after write");
        self.feed.fail(format!("snapshot query failed: {e}"));
      }
    }

    Ok(out)
  }
}

fn select_all(conn: &rusqlite::Connection) -> rusqlite::Result<Vec<RawRecord>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {RECORD_COLUMNS} FROM records ORDER BY serial_number ASC, record_id ASC"
  ))?;
  stmt
    .query_map([], RawRecord::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()
}

fn decode_all(raws: Vec<RawRecord>) -> Result<Vec<Record>> {
  raws.into_iter().map(RawRecord::into_record).collect()
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for SqliteStore {
  type Error = crate::Error;

  async fn create(&self, fields: RecordFields) -> Result<Record> {
    fields.validate()?;

    let record = Record { id: Uuid::new_v4(), fields };
    let params = record_params(&encode_uuid(record.id), &record.fields);

    self
      .write(move |conn| {
        let n = conn.execute(
          &format!(
            "INSERT INTO records ({RECORD_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"
          ),
          rusqlite::params_from_iter(params.iter()),
        )?;
        Ok(((), n))
      })
      .await?;

    tracing::info!(record_id = %record.id, "record created");
    Ok(record)
  }

  async fn get(&self, id: Uuid) -> Result<Option<Record>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawRecord> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {RECORD_COLUMNS} FROM records WHERE record_id = ?1"),
              rusqlite::params![id_str],
              RawRecord::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawRecord::into_record).transpose()
  }

  async fn update(&self, id: Uuid, fields: RecordFields) -> Result<Option<Record>> {
    fields.validate()?;

    let params = record_params(&encode_uuid(id), &fields);

    let touched = self
      .write(move |conn| {
        let n = conn.execute(
          "UPDATE records SET
             serial_number = ?2, name = ?3, address = ?4, dob = ?5,
             occupation = ?6, son_name = ?7, daughter_name = ?8,
             father_name = ?9, mother_name = ?10,
             grandfather_name = ?11, grandmother_name = ?12
           WHERE record_id = ?1",
          rusqlite::params_from_iter(params.iter()),
        )?;
        Ok((n, n))
      })
      .await?;

    if touched == 0 {
      tracing::debug!(record_id = %id, "update of missing record");
      return Ok(None);
    }
    tracing::info!(record_id = %id, "record updated");
    Ok(Some(Record { id, fields }))
  }

  async fn delete(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let touched = self
      .write(move |conn| {
        let n = conn.execute(
          "DELETE FROM records WHERE record_id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok((n, n))
      })
      .await?;

    if touched == 0 {
      tracing::debug!(record_id = %id, "delete of missing record");
      return Ok(false);
    }
    tracing::info!(record_id = %id, "record deleted");
    Ok(true)
  }

  async fn list(&self) -> Result<Snapshot> {
    let version = Arc::clone(&self.version);

    let (v, raws) = self
      .conn
      .call(move |conn| {
        let raws = select_all(conn)?;
        Ok((version.load(Ordering::SeqCst), raws))
      })
      .await?;

    Ok(Snapshot::new(v, decode_all(raws)?))
  }

  async fn subscribe(&self) -> Result<Subscription> { Ok(self.feed.subscribe()) }
}
