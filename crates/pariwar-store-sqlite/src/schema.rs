//! SQL schema for the Pariwar SQLite store.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per record. Every column except record_id is free text and may be
-- empty; the required-field check happens before the row is written.
CREATE TABLE IF NOT EXISTS records (
    record_id        TEXT PRIMARY KEY,
    serial_number    TEXT NOT NULL,
    name             TEXT NOT NULL,
    address          TEXT NOT NULL DEFAULT '',
    dob              TEXT NOT NULL DEFAULT '',
    occupation       TEXT NOT NULL DEFAULT '',
    son_name         TEXT NOT NULL DEFAULT '',
    daughter_name    TEXT NOT NULL DEFAULT '',
    father_name      TEXT NOT NULL DEFAULT '',
    mother_name      TEXT NOT NULL DEFAULT '',
    grandfather_name TEXT NOT NULL DEFAULT '',
    grandmother_name TEXT NOT NULL DEFAULT ''
);

-- BINARY collation: byte-wise string order, so '10' sorts before '2'.
CREATE INDEX IF NOT EXISTS records_serial_idx ON records(serial_number, record_id);

PRAGMA user_version = 1;
";

/// Column list shared by every `SELECT`, in [`crate::encode::RawRecord`] order.
pub const RECORD_COLUMNS: &str = "record_id, serial_number, name, address, dob, \
  occupation, son_name, daughter_name, father_name, mother_name, \
  grandfather_name, grandmother_name";
