//! Badge kinds, rule tables, and the pure qualification check.
//!
//! Badge evaluation is stateless: given a snapshot of a user's aggregates
//! it returns every badge the user currently qualifies for. Thresholds are
//! evaluated independently, not as mutually exclusive tiers — a user who
//! jumps straight past several level thresholds qualifies for all of them
//! in the same pass. Awarding at-most-once is the storage layer's job
//! (UNIQUE constraint, duplicate insert absorbed).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::activity::{ActivityKind, KindTotals};

// ─── Badge kinds ─────────────────────────────────────────────────────────────

/// The closed set of achievement badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeKind {
  // Level family — total-points thresholds.
  Bronze,
  Silver,
  Gold,
  Platinum,
  EcoChampion,
  // Activity family — lifetime approved-quantity thresholds.
  TreeLover,
  RecyclingHero,
  CleanupMaster,
  AwarenessAdvocate,
  EnergySaver,
  // Special family — external engagement counters.
  EventParticipant,
  TeamPlayer,
}

// ─── Rule tables ─────────────────────────────────────────────────────────────

/// Level badges: awarded when `total_points` meets the threshold.
pub const LEVEL_BADGES: [(BadgeKind, i64, &str); 5] = [
  (BadgeKind::Bronze, 50, "Earned your first 50 points!"),
  (
    BadgeKind::Silver,
    200,
    "Reached 200 points - you're making a difference!",
  ),
  (BadgeKind::Gold, 500, "Gold level achieved with 500 points!"),
  (
    BadgeKind::Platinum,
    1000,
    "Platinum status - 1000 points earned!",
  ),
  (
    BadgeKind::EcoChampion,
    2000,
    "Ultimate Eco Champion - 2000+ points!",
  ),
];

/// Activity badges: awarded when the lifetime approved quantity for the
/// kind meets the threshold.
pub const ACTIVITY_BADGES: [(BadgeKind, ActivityKind, f64, &str); 5] = [
  (
    BadgeKind::TreeLover,
    ActivityKind::TreePlantation,
    10.0,
    "Planted 10 or more trees!",
  ),
  (
    BadgeKind::RecyclingHero,
    ActivityKind::Recycling,
    50.0,
    "Recycled 50kg or more of materials!",
  ),
  (
    BadgeKind::CleanupMaster,
    ActivityKind::CleanupDrive,
    25.0,
    "Cleaned up 25kg or more of waste!",
  ),
  (
    BadgeKind::AwarenessAdvocate,
    ActivityKind::AwarenessCampaign,
    20.0,
    "Participated in 20+ hours of awareness campaigns!",
  ),
  (
    BadgeKind::EnergySaver,
    ActivityKind::EnergySaving,
    100.0,
    "Saved 100+ kWh of energy!",
  ),
];

/// Events a user must attend before the EventParticipant badge.
pub const EVENTS_ATTENDED_THRESHOLD: i64 = 5;

// ─── Snapshot & evaluation ───────────────────────────────────────────────────

/// Everything badge evaluation reads: cached aggregates, per-kind lifetime
/// sums over Approved submissions, and the engagement counters fed by the
/// external event/team collaborators.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateSnapshot {
  pub total_points:    i64,
  pub kind_totals:     KindTotals,
  pub events_attended: i64,
  pub has_team:        bool,
}

/// Every badge the snapshot qualifies for, paired with its award
/// description. Pure and idempotent: the same snapshot always yields the
/// same set, and the caller filters out badges already held.
pub fn qualified(snapshot: &AggregateSnapshot) -> Vec<(BadgeKind, String)> {
  let mut earned = Vec::new();

  for (kind, threshold, description) in LEVEL_BADGES {
    if snapshot.total_points >= threshold {
      earned.push((kind, description.to_owned()));
    }
  }

  for (kind, activity, threshold, description) in ACTIVITY_BADGES {
    if snapshot.kind_totals.get(activity) >= threshold {
      earned.push((kind, description.to_owned()));
    }
  }

  if snapshot.events_attended >= EVENTS_ATTENDED_THRESHOLD {
    earned.push((
      BadgeKind::EventParticipant,
      format!("Attended {} eco-events!", snapshot.events_attended),
    ));
  }

  if snapshot.has_team {
    earned.push((
      BadgeKind::TeamPlayer,
      "Active team member contributing to collective goals!".to_owned(),
    ));
  }

  earned
}

// ─── Awarded badge ───────────────────────────────────────────────────────────

/// A badge held by a user. Created at most once per (user, kind); never
/// updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserBadge {
  pub user_id:     Uuid,
  pub kind:        BadgeKind,
  pub earned_at:   DateTime<Utc>,
  pub description: String,
}

// ─── Tests ───────────────────────────────────────────────────────────────────
