//! Challenges — time-bounded goals with a numeric target.
//!
//! Title and description arrive from an external generator and are opaque
//! here. The core tracks progress, clamps it into `[0, target_value]`, and
//! guarantees the completion reward is credited exactly once (the credit
//! itself is a ledger append performed by the store).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Challenge ───────────────────────────────────────────────────────────────

/// One goal tracker for one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Challenge {
  pub challenge_id:     Uuid,
  pub user_id:          Uuid,
  pub title:            String,
  pub description:      String,
  pub target_value:     i64,
  /// Always within `[0, target_value]`.
  pub current_progress: i64,
  /// Credited to the user's ledger exactly once, on completion.
  pub reward_points:    i64,
  pub is_completed:     bool,
  pub created_at:       DateTime<Utc>,
  pub expires_at:       DateTime<Utc>,
  pub completed_at:     Option<DateTime<Utc>>,
}

/// The result of applying a progress report.
#[derive(Debug, Clone)]
pub struct ProgressOutcome {
  pub challenge:       Challenge,
  /// True only on the report that first reaches the target — the single
  /// report whose reward the store must credit.
  pub newly_completed: bool,
}

impl Challenge {
  pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
    now > self.expires_at
  }

  /// Percentage of the target reached, capped at 100.
  pub fn progress_percent(&self) -> f64 {
    if self.target_value == 0 {
      return 0.0;
    }
    f64::min(
      100.0,
      (self.current_progress as f64 / self.target_value as f64) * 100.0,
    )
  }

  /// Apply an incremental progress report.
  ///
  /// `value` is added to the current progress and the result is clamped
  /// into `[0, target_value]`; reporting past the target is
  /// clamp-not-reject. Reaching the target for the first time marks the
  /// challenge completed and stamps `completed_at` — unless the challenge
  /// has already expired, in which case progress is stored but completion
  /// (and thus the reward) never triggers. Reports after completion keep
  /// updating the clamped progress but never re-complete.
  pub fn apply_progress(mut self, value: i64, now: DateTime<Utc>) -> ProgressOutcome {
    // Saturating: an extreme report must land on the clamp bounds, not
    // wrap around them.
    self.current_progress = self
      .current_progress
      .saturating_add(value)
      .clamp(0, self.target_value);

    let newly_completed = !self.is_completed
      && self.current_progress >= self.target_value
      && !self.is_expired(now);

    if newly_completed {
      self.is_completed = true;
      self.completed_at = Some(now);
    }

    ProgressOutcome {
      challenge: self,
      newly_completed,
    }
  }
}

// ─── NewChallenge ────────────────────────────────────────────────────────────

/// Input to [`crate::store::RewardLedger::create_challenge`].
#[derive(Debug, Clone)]
pub struct NewChallenge {
  pub user_id:       Uuid,
  pub title:         String,
  pub description:   String,
  pub target_value:  i64,
  pub reward_points: i64,
  pub expires_at:    DateTime<Utc>,
}

impl NewChallenge {
  /// Validating constructor: the target must be positive so the clamp
  /// range and completion condition are well defined, and the reward must
  /// be non-negative so completion can only ever credit.
  pub fn new(
    user_id: Uuid,
    title: impl Into<String>,
    description: impl Into<String>,
    target_value: i64,
    reward_points: i64,
    expires_at: DateTime<Utc>,
  ) -> Result<Self> {
    if target_value <= 0 {
      return Err(Error::InvalidTarget(target_value));
    }
    if reward_points < 0 {
      return Err(Error::InvalidPoints(reward_points));
    }
    Ok(Self {
      user_id,
      title: title.into(),
      description: description.into(),
      target_value,
      reward_points,
      expires_at,
    })
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use chrono::Duration;

  use super::*;

  fn challenge(target: i64) -> Challenge {
    let now = Utc::now();
    Challenge {
      challenge_id:     Uuid::new_v4(),
      user_id:          Uuid::new_v4(),
      title:            "Weekly recycling push".into(),
      description:      "Recycle every day this week".into(),
      target_value:     target,
      current_progress: 0,
      reward_points:    100,
      is_completed:     false,
      created_at:       now,
      expires_at:       now + Duration::days(7),
      completed_at:     None,
    }
  }

  #[test]
  fn progress_clamps_to_target() {
    let out = challenge(100).apply_progress(150, Utc::now());
    assert_eq!(out.challenge.current_progress, 100);
    assert!(out.challenge.is_completed);
    assert!(out.newly_completed);
  }

  #[test]
  fn negative_progress_clamps_to_zero() {
    let out = challenge(10).apply_progress(-3, Utc::now());
    assert_eq!(out.challenge.current_progress, 0);
    assert!(!out.challenge.is_completed);
  }

  #[test]
  fn extreme_reports_saturate_onto_clamp_bounds() {
    let now = Utc::now();

    let mut c = challenge(10);
    c.current_progress = 7;
    let out = c.apply_progress(i64::MAX, now);
    assert_eq!(out.challenge.current_progress, 10);
    assert!(out.newly_completed);

    let mut c = challenge(10);
    c.current_progress = 7;
    let out = c.apply_progress(i64::MIN, now);
    assert_eq!(out.challenge.current_progress, 0);
    assert!(!out.challenge.is_completed);
  }

  #[test]
  fn increments_accumulate_across_reports() {
    let now = Utc::now();
    let first = challenge(10).apply_progress(7, now);
    assert_eq!(first.challenge.current_progress, 7);
    assert!(!first.newly_completed);

    let second = first.challenge.apply_progress(5, now);
    assert_eq!(second.challenge.current_progress, 10);
    assert!(second.newly_completed);
  }

  #[test]
  fn completion_triggers_once() {
    let now = Utc::now();
    let first = challenge(10).apply_progress(12, now);
    assert!(first.newly_completed);

    let second = first.challenge.apply_progress(10, now);
    assert!(second.challenge.is_completed);
    assert!(!second.newly_completed, "re-report must not re-credit");
  }

  #[test]
  fn new_challenge_validates_target_and_reward() {
    let user = Uuid::new_v4();
    let expires = Utc::now() + Duration::days(7);

    let err = NewChallenge::new(user, "t", "d", 0, 100, expires).unwrap_err();
    assert!(matches!(err, Error::InvalidTarget(0)));

    let err = NewChallenge::new(user, "t", "d", 10, -5, expires).unwrap_err();
    assert!(matches!(err, Error::InvalidPoints(-5)));

    // A zero reward is a valid no-prize goal.
    assert!(NewChallenge::new(user, "t", "d", 10, 0, expires).is_ok());
  }

  #[test]
  fn expired_challenge_stores_progress_without_completing() {
    let mut c = challenge(10);
    c.expires_at = Utc::now() - Duration::hours(1);

    let out = c.apply_progress(10, Utc::now());
    assert_eq!(out.challenge.current_progress, 10);
    assert!(!out.challenge.is_completed);
    assert!(!out.newly_completed);
  }
}
