//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! UUIDs are stored as hyphenated lowercase strings; every record field is
//! stored verbatim.

use pariwar_core::record::{Record, RecordFields};
use uuid::Uuid;

use crate::Result;

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `records` row, in
/// [`crate::schema::RECORD_COLUMNS`] order.
pub struct RawRecord {
  pub record_id: String,
  pub fields:    RecordFields,
}

impl RawRecord {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      record_id: row.get(0)?,
      fields:    RecordFields {
        serial_number:    row.get(1)?,
        name:             row.get(2)?,
        address:          row.get(3)?,
        dob:              row.get(4)?,
        occupation:       row.get(5)?,
        son_name:         row.get(6)?,
        daughter_name:    row.get(7)?,
        father_name:      row.get(8)?,
        mother_name:      row.get(9)?,
        grandfather_name: row.get(10)?,
        grandmother_name: row.get(11)?,
      },
    })
  }

  pub fn into_record(self) -> Result<Record> {
    Ok(Record {
      id:     decode_uuid(&self.record_id)?,
      fields: self.fields,
    })
  }
}

/// The twelve bound parameters for an `INSERT`, identifier first.
pub fn record_params(id: &str, f: &RecordFields) -> [String; 12] {
  [
    id.to_owned(),
    f.serial_number.clone(),
    f.name.clone(),
    f.address.clone(),
    f.dob.clone(),
    f.occupation.clone(),
    f.son_name.clone(),
    f.daughter_name.clone(),
    f.father_name.clone(),
    f.mother_name.clone(),
    f.grandfather_name.clone(),
    f.grandmother_name.clone(),
  ]
}
