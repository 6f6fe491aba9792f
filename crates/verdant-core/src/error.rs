//! Error types for `verdant-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::activity::SubmissionStatus;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
  #[error("user not found: {0}")]
  UserNotFound(Uuid),

  #[error("submission not found: {0}")]
  SubmissionNotFound(Uuid),

  #[error("challenge not found: {0}")]
  ChallengeNotFound(Uuid),

  /// Approve or reject attempted on a submission that is no longer Pending.
  /// The operation performs no side effect.
  #[error("submission {submission} is {status:?}; only Pending submissions can transition")]
  InvalidStateTransition {
    submission: Uuid,
    status:     SubmissionStatus,
  },

  #[error("submission quantity must be a positive finite number, got {0}")]
  InvalidQuantity(f64),

  #[error("challenge target must be positive, got {0}")]
  InvalidTarget(i64),

  /// A reward credit (external or challenge) with negative points. The
  /// ledger only ever credits; there is no debit path.
  #[error("reward points must be non-negative, got {0}")]
  InvalidPoints(i64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
