//! Error type for `verdant-store-sqlite`.

use thiserror::Error;
use verdant_core::store::StoreError;

#[derive(Debug, Error)]
pub enum Error {
  /// A domain rule rejected the operation (invalid transition, unknown
  /// entity, bad input). The transaction was rolled back.
  #[error("core error: {0}")]
  Core(#[from] verdant_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("decode error: {0}")]
  Decode(String),
}

impl StoreError for Error {
  fn as_core(&self) -> Option<&verdant_core::Error> {
    match self {
      Self::Core(e) => Some(e),
      _ => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
