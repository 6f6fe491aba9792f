//! Users, their cached aggregates, and the level ladder.
//!
//! A user's `total_points` and `total_carbon_saved` are a cache of the
//! ledger sum and are only ever written by full recomputation over the
//! ledger — never incremented in place. The level is never stored at all;
//! it is derived fresh from `total_points` on every read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── User ────────────────────────────────────────────────────────────────────

/// A participant in the sustainability programme. The profile aggregate row
/// is created alongside the user in the same transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub user_id:      Uuid,
  pub display_name: String,
  pub created_at:   DateTime<Utc>,
}

// ─── Level ladder ────────────────────────────────────────────────────────────

/// Levels derived from total points on a fixed threshold ladder.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Level {
  Newbie,
  Bronze,
  Silver,
  Gold,
  Platinum,
  EcoChampion,
}

impl Level {
  /// Every level, lowest first.
  pub const LADDER: [Level; 6] = [
    Self::Newbie,
    Self::Bronze,
    Self::Silver,
    Self::Gold,
    Self::Platinum,
    Self::EcoChampion,
  ];

  /// Minimum total points required to hold this level.
  pub fn min_points(self) -> i64 {
    match self {
      Self::Newbie => 0,
      Self::Bronze => 50,
      Self::Silver => 200,
      Self::Gold => 500,
      Self::Platinum => 1000,
      Self::EcoChampion => 2000,
    }
  }

  /// The level a user with `total_points` currently holds.
  pub fn for_points(total_points: i64) -> Self {
    Self::LADDER
      .into_iter()
      .rev()
      .find(|level| total_points >= level.min_points())
      .unwrap_or(Self::Newbie)
  }

  /// The next level up, or `None` at the top of the ladder.
  pub fn next(self) -> Option<Self> {
    let pos = Self::LADDER.iter().position(|l| *l == self)?;
    Self::LADDER.get(pos + 1).copied()
  }

  /// Points still needed to reach the next level; 0 at the top.
  pub fn points_to_next(total_points: i64) -> i64 {
    match Self::for_points(total_points).next() {
      Some(next) => next.min_points() - total_points,
      None => 0,
    }
  }

  /// Progress through the current level band as a percentage, 100 at the
  /// top of the ladder.
  pub fn progress_percent(total_points: i64) -> f64 {
    let current = Self::for_points(total_points);
    let Some(next) = current.next() else {
      return 100.0;
    };
    let floor = current.min_points();
    let span = next.min_points() - floor;
    ((total_points - floor) as f64 / span as f64) * 100.0
  }

  pub fn title(self) -> &'static str {
    match self {
      Self::Newbie => "Newbie",
      Self::Bronze => "Bronze",
      Self::Silver => "Silver",
      Self::Gold => "Gold",
      Self::Platinum => "Platinum",
      Self::EcoChampion => "Eco Champion",
    }
  }
}

// ─── Profile view ────────────────────────────────────────────────────────────

/// The computed read model for a user's standing — totals from the cached
/// aggregate row plus the level fields derived fresh on every read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileView {
  pub user:               User,
  /// Always equals the sum of `points_earned` over the user's ledger.
  pub total_points:       i64,
  /// Always equals the sum of `carbon_saved_kg` over the user's ledger.
  pub total_carbon_saved: f64,
  pub current_level:      Level,
  pub points_to_next:     i64,
  pub level_progress:     f64,
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ladder_thresholds() {
    assert_eq!(Level::for_points(0), Level::Newbie);
    assert_eq!(Level::for_points(49), Level::Newbie);
    assert_eq!(Level::for_points(50), Level::Bronze);
    assert_eq!(Level::for_points(199), Level::Bronze);
    assert_eq!(Level::for_points(200), Level::Silver);
    assert_eq!(Level::for_points(500), Level::Gold);
    assert_eq!(Level::for_points(1000), Level::Platinum);
    assert_eq!(Level::for_points(1999), Level::Platinum);
    assert_eq!(Level::for_points(2000), Level::EcoChampion);
    assert_eq!(Level::for_points(25_000), Level::EcoChampion);
  }

  #[test]
  fn points_to_next_counts_down() {
    assert_eq!(Level::points_to_next(0), 50);
    assert_eq!(Level::points_to_next(49), 1);
    assert_eq!(Level::points_to_next(50), 150);
    assert_eq!(Level::points_to_next(1500), 500);
    assert_eq!(Level::points_to_next(2000), 0);
  }

  #[test]
  fn progress_percent_spans_level_band() {
    assert_eq!(Level::progress_percent(0), 0.0);
    assert_eq!(Level::progress_percent(25), 50.0);
    assert_eq!(Level::progress_percent(50), 0.0);
    assert_eq!(Level::progress_percent(125), 50.0);
    assert_eq!(Level::progress_percent(2000), 100.0);
  }
}
