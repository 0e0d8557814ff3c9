//! Record types (one genealogical entry in the family register).
//!
//! Every field is free text. The identifier is assigned by the store and never
//! changes; all other fields are overwritten as a whole on edit.

use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator as _, IntoStaticStr};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Field ───────────────────────────────────────────────────────────────────

/// One editable field of a record, in form order.
///
/// The static string form is the camelCase JSON key used on the wire.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr,
  Serialize, Deserialize,
)]
#[strum(serialize_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum Field {
  SerialNumber,
  Name,
  Address,
  Dob,
  Occupation,
  SonName,
  DaughterName,
  FatherName,
  MotherName,
  GrandfatherName,
  GrandmotherName,
}

impl Field {
  /// Form order; indexed by discriminant.
  const ORDER: [Self; 11] = [
    Self::SerialNumber,
    Self::Name,
    Self::Address,
    Self::Dob,
    Self::Occupation,
    Self::SonName,
    Self::DaughterName,
    Self::FatherName,
    Self::MotherName,
    Self::GrandfatherName,
    Self::GrandmotherName,
  ];

  /// All fields in form order.
  pub fn all() -> impl Iterator<Item = Self> { Self::iter() }

  /// The JSON key for this field.
  pub fn key(self) -> &'static str { self.into() }

  /// English caption shown next to the input.
  pub fn label(self) -> &'static str {
    match self {
      Self::SerialNumber => "Serial no.",
      Self::Name => "Name",
      Self::Address => "Address",
      Self::Dob => "Date of birth (B.S.)",
      Self::Occupation => "Occupation",
      Self::SonName => "Son's name",
      Self::DaughterName => "Daughter's name",
      Self::FatherName => "Father's name",
      Self::MotherName => "Mother's name",
      Self::GrandfatherName => "Grandfather",
      Self::GrandmotherName => "Grandmother",
    }
  }

  /// Nepali caption used by the printed register.
  pub fn native_label(self) -> &'static str {
    match self {
      Self::SerialNumber => "क्र.सं",
      Self::Name => "नाम",
      Self::Address => "थेगान",
      Self::Dob => "जन्ममिति (वि सं)",
      Self::Occupation => "पेशा",
      Self::SonName => "छोराको नाम",
      Self::DaughterName => "छोरीको नाम",
      Self::FatherName => "बाबुको नाम",
      Self::MotherName => "आमाको नाम",
      Self::GrandfatherName => "हजुरबुवा",
      Self::GrandmotherName => "हजुरआमा",
    }
  }

  /// Whether the form refuses to submit while this field is empty.
  pub fn is_required(self) -> bool {
    matches!(self, Self::SerialNumber | Self::Name)
  }

  /// The field after this one, wrapping around.
  pub fn next(self) -> Self { Self::ORDER[(self as usize + 1) % Self::ORDER.len()] }

  /// The field before this one, wrapping around.
  pub fn prev(self) -> Self {
    Self::ORDER[(self as usize + Self::ORDER.len() - 1) % Self::ORDER.len()]
  }
}

// ─── RecordFields ────────────────────────────────────────────────────────────

/// Everything about a record except its identifier.
///
/// This is the payload of a create or a full-overwrite update. Missing keys
/// deserialise as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordFields {
  pub serial_number:    String,
  pub name:             String,
  pub address:          String,
  /// Free text in the local calendar, e.g. "२०४५/०३/१२".
  pub dob:              String,
  pub occupation:       String,
  pub son_name:         String,
  pub daughter_name:    String,
  pub father_name:      String,
  pub mother_name:      String,
  pub grandfather_name: String,
  pub grandmother_name: String,
}

impl RecordFields {
  /// Convenience constructor for the two required fields; the rest are empty.
  pub fn new(serial_number: impl Into<String>, name: impl Into<String>) -> Self {
    Self {
      serial_number: serial_number.into(),
      name: name.into(),
      ..Self::default()
    }
  }

  pub fn get(&self, field: Field) -> &str {
    match field {
      Field::SerialNumber => &self.serial_number,
      Field::Name => &self.name,
      Field::Address => &self.address,
      Field::Dob => &self.dob,
      Field::Occupation => &self.occupation,
      Field::SonName => &self.son_name,
      Field::DaughterName => &self.daughter_name,
      Field::FatherName => &self.father_name,
      Field::MotherName => &self.mother_name,
      Field::GrandfatherName => &self.grandfather_name,
      Field::GrandmotherName => &self.grandmother_name,
    }
  }

  pub fn get_mut(&mut self, field: Field) -> &mut String {
    match field {
      Field::SerialNumber => &mut self.serial_number,
      Field::Name => &mut self.name,
      Field::Address => &mut self.address,
      Field::Dob => &mut self.dob,
      Field::Occupation => &mut self.occupation,
      Field::SonName => &mut self.son_name,
      Field::DaughterName => &mut self.daughter_name,
      Field::FatherName => &mut self.father_name,
      Field::MotherName => &mut self.mother_name,
      Field::GrandfatherName => &mut self.grandfather_name,
      Field::GrandmotherName => &mut self.grandmother_name,
    }
  }

  pub fn set(&mut self, field: Field, value: impl Into<String>) {
    *self.get_mut(field) = value.into();
  }

  /// Reject the record if a required field is empty.
  ///
  /// Only emptiness is checked; a value of `" "` passes.
  pub fn validate(&self) -> Result<()> {
    match Field::all().find(|f| f.is_required() && self.get(*f).is_empty()) {
      Some(field) => Err(Error::MissingField(field)),
      None => Ok(()),
    }
  }
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// A stored record: the store-assigned identifier plus its fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
  pub id:     Uuid,
  #[serde(flatten)]
  pub fields: RecordFields,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn field_keys_match_serde_names() {
    for field in Field::all() {
      assert_eq!(serde_json::to_value(field).unwrap(), field.key());
    }
  }

  #[test]
  fn only_serial_number_and_name_are_required() {
    let required: Vec<Field> = Field::all().filter(|f| f.is_required()).collect();
    assert_eq!(required, vec![Field::SerialNumber, Field::Name]);
  }

  #[test]
  fn validate_rejects_empty_required_fields() {
    let mut fields = RecordFields::default();
    assert!(matches!(
      fields.validate(),
      Err(Error::MissingField(Field::SerialNumber))
    ));

    fields.serial_number = "1".into();
    assert!(matches!(fields.validate(), Err(Error::MissingField(Field::Name))));

    fields.name = "Ram".into();
    assert!(fields.validate().is_ok());
  }

  #[test]
  fn validate_accepts_whitespace_and_empty_optionals() {
    let fields = RecordFields::new(" ", " ");
    assert!(fields.validate().is_ok());
    assert!(fields.address.is_empty());
  }

  #[test]
  fn focus_order_wraps() {
    assert_eq!(Field::SerialNumber.next(), Field::Name);
    assert_eq!(Field::GrandmotherName.next(), Field::SerialNumber);
    assert_eq!(Field::SerialNumber.prev(), Field::GrandmotherName);
  }

  #[test]
  fn focus_order_visits_every_field_in_form_order() {
    let order: Vec<Field> = Field::all().collect();
    assert_eq!(order, Field::ORDER);

    let mut field = Field::SerialNumber;
    for expected in order.iter().skip(1) {
      field = field.next();
      assert_eq!(field, *expected);
      assert_eq!(field.prev().next(), field);
    }
  }

  #[test]
  fn set_and_get_round_through_every_field() {
    let mut fields = RecordFields::default();
    for field in Field::all() {
      fields.set(field, field.key());
    }
    for field in Field::all() {
      assert_eq!(fields.get(field), field.key());
    }
  }

  #[test]
  fn record_json_is_flat_and_camel_case() {
    let record = Record {
      id:     Uuid::nil(),
      fields: RecordFields {
        father_name: "Hari".into(),
        ..RecordFields::new("1", "Ram")
      },
    };
    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["serialNumber"], "1");
    assert_eq!(json["fatherName"], "Hari");
    assert_eq!(json["id"], Uuid::nil().to_string());

    let partial: RecordFields =
      serde_json::from_str(r#"{"serialNumber":"7","name":"Sita"}"#).unwrap();
    assert_eq!(partial, RecordFields::new("7", "Sita"));
  }
}
