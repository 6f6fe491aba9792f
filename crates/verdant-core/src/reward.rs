//! The reward computation applied on the approval path.

use serde::{Deserialize, Serialize};

use crate::{activity::ActivityKind, badge::BadgeKind};

/// Points for an approved submission: a flat 10 per reported unit,
/// independent of activity kind. Kind-specific factors affect only the
/// carbon figure.
pub fn points_for(quantity: f64) -> i64 {
  (quantity * 10.0).floor() as i64
}

/// Carbon saved (kg) for an approved submission.
pub fn carbon_for(kind: ActivityKind, quantity: f64) -> f64 {
  quantity * kind.carbon_factor()
}

/// What an approval produced, for caller display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardResult {
  pub points:          i64,
  pub carbon_saved_kg: f64,
  /// Badges first awarded during this approval's evaluation pass.
  pub new_badges:      Vec<BadgeKind>,
}
