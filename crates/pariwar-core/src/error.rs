//! Error types for `pariwar-core`.

use thiserror::Error;

use crate::record::Field;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{} is required", .0.label())]
  MissingField(Field),

  #[error("a submission is already in flight")]
  SubmissionPending,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
