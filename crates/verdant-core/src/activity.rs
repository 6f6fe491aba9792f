//! Activity submissions — the raw material of the reward ledger.
//!
//! A submission is a user-reported instance of an eco-activity. It starts
//! Pending and is moved exactly once to Approved or Rejected; both are
//! terminal. Reward fields are written only on the approval transition and
//! are immutable afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Activity kinds ──────────────────────────────────────────────────────────

/// The closed set of eco-activities the campus programme recognises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
  TreePlantation,
  Recycling,
  CleanupDrive,
  AwarenessCampaign,
  EnergySaving,
}

impl ActivityKind {
  /// Every kind, in declaration order. Used to build exhaustive per-kind
  /// tables without runtime string lookups.
  pub const ALL: [ActivityKind; 5] = [
    Self::TreePlantation,
    Self::Recycling,
    Self::CleanupDrive,
    Self::AwarenessCampaign,
    Self::EnergySaving,
  ];

  /// Carbon saved (kg) per reported unit of this activity.
  ///
  /// These are the approval-path constants; the closed enum makes the
  /// mapping exhaustive, so no "unknown kind" default exists.
  pub fn carbon_factor(self) -> f64 {
    match self {
      Self::TreePlantation => 22.0,
      Self::Recycling => 1.5,
      Self::CleanupDrive => 0.5,
      Self::AwarenessCampaign => 5.0,
      Self::EnergySaving => 0.85,
    }
  }

  /// The unit the quantity is measured in, for display.
  pub fn unit(self) -> &'static str {
    match self {
      Self::TreePlantation => "trees",
      Self::Recycling => "kg",
      Self::CleanupDrive => "kg",
      Self::AwarenessCampaign => "hours",
      Self::EnergySaving => "kWh",
    }
  }

  fn index(self) -> usize {
    match self {
      Self::TreePlantation => 0,
      Self::Recycling => 1,
      Self::CleanupDrive => 2,
      Self::AwarenessCampaign => 3,
      Self::EnergySaving => 4,
    }
  }
}

/// Lifetime quantity totals per activity kind, summed over Approved
/// submissions only. Input to badge evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct KindTotals {
  amounts: [f64; 5],
}

impl KindTotals {
  pub fn get(&self, kind: ActivityKind) -> f64 { self.amounts[kind.index()] }

  pub fn add(&mut self, kind: ActivityKind, quantity: f64) {
    self.amounts[kind.index()] += quantity;
  }
}

// ─── Status ──────────────────────────────────────────────────────────────────

/// The submission state machine: `Pending` → `Approved` | `Rejected`.
/// No transition out of a terminal state is permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
  Pending,
  Approved,
  Rejected,
}

impl SubmissionStatus {
  pub fn is_terminal(self) -> bool { !matches!(self, Self::Pending) }
}

// ─── Submission ──────────────────────────────────────────────────────────────

/// A user-reported eco-activity awaiting or having received staff review.
///
/// `points_awarded` and `carbon_saved_kg` are non-zero only when the status
/// is Approved; once Approved, all three fields are immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivitySubmission {
  pub submission_id:   Uuid,
  pub user_id:         Uuid,
  pub kind:            ActivityKind,
  /// Positive amount in [`ActivityKind::unit`] units.
  pub quantity:        f64,
  pub description:     String,
  /// Opaque reference to uploaded evidence (a storage path or URL).
  pub evidence_ref:    Option<String>,
  pub status:          SubmissionStatus,
  pub points_awarded:  i64,
  pub carbon_saved_kg: f64,
  /// Server-assigned; never changes after creation.
  pub submitted_at:    DateTime<Utc>,
  /// Set by the reviewer on rejection; empty otherwise.
  pub feedback:        String,
}

// ─── NewSubmission ───────────────────────────────────────────────────────────

/// Input to [`crate::store::RewardLedger::submit`].
/// `submitted_at` is always set by the store; it is not accepted from
/// callers.
#[derive(Debug, Clone)]
pub struct NewSubmission {
  pub user_id:      Uuid,
  pub kind:         ActivityKind,
  pub quantity:     f64,
  pub description:  String,
  pub evidence_ref: Option<String>,
}

impl NewSubmission {
  /// Validating constructor: the quantity must be positive and finite.
  pub fn new(
    user_id: Uuid,
    kind: ActivityKind,
    quantity: f64,
    description: impl Into<String>,
    evidence_ref: Option<String>,
  ) -> Result<Self> {
    if !quantity.is_finite() || quantity <= 0.0 {
      return Err(Error::InvalidQuantity(quantity));
    }
    Ok(Self {
      user_id,
      kind,
      quantity,
      description: description.into(),
      evidence_ref,
    })
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
