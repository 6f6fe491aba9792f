//! Ledger entries — the immutable audit trail of every reward issuance.
//!
//! Exactly one entry is appended per successful approval, and one per
//! challenge completion or external reward credit. Entries are never
//! updated or deleted; all user aggregates are recomputed from this table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An immutable record of points and carbon savings credited to a user.
/// Once written, no field is ever updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
  pub entry_id:        Uuid,
  pub user_id:         Uuid,
  /// The originating submission, if any. `None` for non-submission rewards
  /// (challenge completions, event attendance credits).
  pub submission_id:   Option<Uuid>,
  pub carbon_saved_kg: f64,
  pub points_earned:   i64,
  /// Free-text origin note for entries with no submission back-reference.
  pub note:            Option<String>,
  /// Server-assigned; never changes after creation.
  pub recorded_at:     DateTime<Utc>,
}
