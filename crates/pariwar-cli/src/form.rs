//! The record form, which collects field values and submits them to the store.
//!
//! The same form serves both new records and edits. An edit holds a full copy
//! of the original record, so fields the user never touches are written back
//! unchanged.

use std::sync::atomic::{AtomicU64, Ordering};

use pariwar_core::{
  record::{Field, Record, RecordFields},
  store::RecordStore,
};
use thiserror::Error;
use uuid::Uuid;

/// Tickets are unique across every form in the process, so a late result for
/// a closed form can never settle the one that replaced it.
static NEXT_TICKET: AtomicU64 = AtomicU64::new(1);

// ─── Types ────────────────────────────────────────────────────────────────────

/// Where a submission goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
  Create,
  Edit(Uuid),
}

#[derive(Debug, Error)]
pub enum SubmitError<E> {
  /// Rejected before any request was made.
  #[error(transparent)]
  Rejected(#[from] pariwar_core::Error),

  /// The record being edited was deleted in the meantime.
  #[error("record {0} no longer exists")]
  Gone(Uuid),

  #[error("{0}")]
  Store(#[source] E),
}

/// A validated payload ready to be sent, tagged with the ticket that
/// [`RecordForm::settle`] expects back.
#[derive(Debug, Clone)]
pub struct Submission {
  pub ticket: u64,
  pub mode:   FormMode,
  pub fields: RecordFields,
}

impl Submission {
  /// Create a new record, or overwrite the edited one in full.
  pub async fn send<S>(&self, store: &S) -> Result<Record, SubmitError<S::Error>>
  where
    S: RecordStore,
  {
    match self.mode {
      FormMode::Create => store
        .create(self.fields.clone())
        .await
        .map_err(SubmitError::Store),
      FormMode::Edit(id) => store
        .update(id, self.fields.clone())
        .await
        .map_err(SubmitError::Store)?
        .ok_or(SubmitError::Gone(id)),
    }
  }
}

// ─── RecordForm ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct RecordForm {
  mode:    FormMode,
  fields:  RecordFields,
  focus:   Field,
  /// Ticket of the outstanding submission; doubles as the loading flag.
  pending: Option<u64>,
}

impl RecordForm {
  /// An empty form for a new record.
  pub fn create() -> Self { Self::with(FormMode::Create, RecordFields::default()) }

  /// A form pre-populated with a full copy of `record`.
  pub fn edit(record: &Record) -> Self {
    Self::with(FormMode::Edit(record.id), record.fields.clone())
  }

  fn with(mode: FormMode, fields: RecordFields) -> Self {
    Self {
      mode,
      fields,
      focus: Field::SerialNumber,
      pending: None,
    }
  }

  pub fn mode(&self) -> FormMode { self.mode }

  pub fn fields(&self) -> &RecordFields { &self.fields }

  pub fn focus(&self) -> Field { self.focus }

  pub fn is_submitting(&self) -> bool { self.pending.is_some() }

  pub fn title(&self) -> &'static str {
    match self.mode {
      FormMode::Create => "New record",
      FormMode::Edit(_) => "Edit record",
    }
  }

  // ── Editing ─────────────────────────────────────────────────────────────

  #[cfg(test)]
  pub fn set(&mut self, field: Field, value: impl Into<String>) {
    self.fields.set(field, value);
  }

  /// Append a character to the focused field.
  pub fn insert(&mut self, c: char) { self.fields.get_mut(self.focus).push(c); }

  /// Remove the last character of the focused field.
  pub fn backspace(&mut self) { self.fields.get_mut(self.focus).pop(); }

  pub fn focus_next(&mut self) { self.focus = self.focus.next(); }

  pub fn focus_prev(&mut self) { self.focus = self.focus.prev(); }

  #[cfg(test)]
  pub fn focus_on(&mut self, field: Field) { self.focus = field; }

  // ── Submission ──────────────────────────────────────────────────────────

  /// Validate and mark the form as submitting.
  ///
  /// On a missing required field, focus moves to it and nothing is sent.
  pub fn begin_submit(&mut self) -> pariwar_core::Result<Submission> {
    if self.pending.is_some() {
      return Err(pariwar_core::Error::SubmissionPending);
    }
    if let Err(e) = self.fields.validate() {
      if let pariwar_core::Error::MissingField(field) = &e {
        self.focus = *field;
      }
      return Err(e);
    }

    let ticket = NEXT_TICKET.fetch_add(1, Ordering::Relaxed);
    self.pending = Some(ticket);
    Ok(Submission {
      ticket,
      mode:   self.mode,
      fields: self.fields.clone(),
    })
  }

  /// Clear the loading flag once the request for `ticket` has settled,
  /// whatever its outcome. Returns `false` for a ticket that is not current.
  pub fn settle(&mut self, ticket: u64) -> bool {
    if self.pending == Some(ticket) {
      self.pending = None;
      true
    } else {
      false
    }
  }
}
