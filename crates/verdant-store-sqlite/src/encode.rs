//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Enums are stored as
//! snake_case discriminant strings. UUIDs are stored as hyphenated
//! lowercase strings.

use chrono::{DateTime, Utc};
use uuid::Uuid;
use verdant_core::{
  activity::{ActivityKind, ActivitySubmission, SubmissionStatus},
  badge::{BadgeKind, UserBadge},
  challenge::Challenge,
  ledger::LedgerEntry,
  profile::User,
};

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(e.to_string()))
}

// ─── ActivityKind ────────────────────────────────────────────────────────────

pub fn encode_kind(k: ActivityKind) -> &'static str {
  match k {
    ActivityKind::TreePlantation => "tree_plantation",
    ActivityKind::Recycling => "recycling",
    ActivityKind::CleanupDrive => "cleanup_drive",
    ActivityKind::AwarenessCampaign => "awareness_campaign",
    ActivityKind::EnergySaving => "energy_saving",
  }
}

pub fn decode_kind(s: &str) -> Result<ActivityKind> {
  match s {
    "tree_plantation" => Ok(ActivityKind::TreePlantation),
    "recycling" => Ok(ActivityKind::Recycling),
    "cleanup_drive" => Ok(ActivityKind::CleanupDrive),
    "awareness_campaign" => Ok(ActivityKind::AwarenessCampaign),
    "energy_saving" => Ok(ActivityKind::EnergySaving),
    other => Err(Error::Decode(format!("unknown activity kind: {other:?}"))),
  }
}

// ─── SubmissionStatus ────────────────────────────────────────────────────────

pub fn encode_status(s: SubmissionStatus) -> &'static str {
  match s {
    SubmissionStatus::Pending => "pending",
    SubmissionStatus::Approved => "approved",
    SubmissionStatus::Rejected => "rejected",
  }
}

pub fn decode_status(s: &str) -> Result<SubmissionStatus> {
  match s {
    "pending" => Ok(SubmissionStatus::Pending),
    "approved" => Ok(SubmissionStatus::Approved),
    "rejected" => Ok(SubmissionStatus::Rejected),
    other => Err(Error::Decode(format!("unknown status: {other:?}"))),
  }
}

// ─── BadgeKind ───────────────────────────────────────────────────────────────

pub fn encode_badge_kind(k: BadgeKind) -> &'static str {
  match k {
    BadgeKind::Bronze => "bronze",
    BadgeKind::Silver => "silver",
    BadgeKind::Gold => "gold",
    BadgeKind::Platinum => "platinum",
    BadgeKind::EcoChampion => "eco_champion",
    BadgeKind::TreeLover => "tree_lover",
    BadgeKind::RecyclingHero => "recycling_hero",
    BadgeKind::CleanupMaster => "cleanup_master",
    BadgeKind::AwarenessAdvocate => "awareness_advocate",
    BadgeKind::EnergySaver => "energy_saver",
    BadgeKind::EventParticipant => "event_participant",
    BadgeKind::TeamPlayer => "team_player",
  }
}

pub fn decode_badge_kind(s: &str) -> Result<BadgeKind> {
  match s {
    "bronze" => Ok(BadgeKind::Bronze),
    "silver" => Ok(BadgeKind::Silver),
    "gold" => Ok(BadgeKind::Gold),
    "platinum" => Ok(BadgeKind::Platinum),
    "eco_champion" => Ok(BadgeKind::EcoChampion),
    "tree_lover" => Ok(BadgeKind::TreeLover),
    "recycling_hero" => Ok(BadgeKind::RecyclingHero),
    "cleanup_master" => Ok(BadgeKind::CleanupMaster),
    "awareness_advocate" => Ok(BadgeKind::AwarenessAdvocate),
    "energy_saver" => Ok(BadgeKind::EnergySaver),
    "event_participant" => Ok(BadgeKind::EventParticipant),
    "team_player" => Ok(BadgeKind::TeamPlayer),
    other => Err(Error::Decode(format!("unknown badge kind: {other:?}"))),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:      String,
  pub display_name: String,
  pub created_at:   String,
}

impl RawUser {
  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:      decode_uuid(&self.user_id)?,
      display_name: self.display_name,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `submissions` row.
pub struct RawSubmission {
  pub submission_id:   String,
  pub user_id:         String,
  pub kind:            String,
  pub quantity:        f64,
  pub description:     String,
  pub evidence_ref:    Option<String>,
  pub status:          String,
  pub points_awarded:  i64,
  pub carbon_saved_kg: f64,
  pub submitted_at:    String,
  pub feedback:        String,
}

impl RawSubmission {
  pub fn into_submission(self) -> Result<ActivitySubmission> {
    Ok(ActivitySubmission {
      submission_id:   decode_uuid(&self.submission_id)?,
      user_id:         decode_uuid(&self.user_id)?,
      kind:            decode_kind(&self.kind)?,
      quantity:        self.quantity,
      description:     self.description,
      evidence_ref:    self.evidence_ref,
      status:          decode_status(&self.status)?,
      points_awarded:  self.points_awarded,
      carbon_saved_kg: self.carbon_saved_kg,
      submitted_at:    decode_dt(&self.submitted_at)?,
      feedback:        self.feedback,
    })
  }
}

/// Raw strings read directly from a `ledger` row.
pub struct RawLedgerEntry {
  pub entry_id:        String,
  pub user_id:         String,
  pub submission_id:   Option<String>,
  pub carbon_saved_kg: f64,
  pub points_earned:   i64,
  pub note:            Option<String>,
  pub recorded_at:     String,
}

impl RawLedgerEntry {
  pub fn into_entry(self) -> Result<LedgerEntry> {
    Ok(LedgerEntry {
      entry_id:        decode_uuid(&self.entry_id)?,
      user_id:         decode_uuid(&self.user_id)?,
      submission_id:   self
        .submission_id
        .as_deref()
        .map(decode_uuid)
        .transpose()?,
      carbon_saved_kg: self.carbon_saved_kg,
      points_earned:   self.points_earned,
      note:            self.note,
      recorded_at:     decode_dt(&self.recorded_at)?,
    })
  }
}

/// Raw strings read directly from a `badges` row.
pub struct RawBadge {
  pub user_id:     String,
  pub kind:        String,
  pub earned_at:   String,
  pub description: String,
}

impl RawBadge {
  pub fn into_badge(self) -> Result<UserBadge> {
    Ok(UserBadge {
      user_id:     decode_uuid(&self.user_id)?,
      kind:        decode_badge_kind(&self.kind)?,
      earned_at:   decode_dt(&self.earned_at)?,
      description: self.description,
    })
  }
}

/// Raw strings read directly from a `challenges` row.
pub struct RawChallenge {
  pub challenge_id:     String,
  pub user_id:          String,
  pub title:            String,
  pub description:      String,
  pub target_value:     i64,
  pub current_progress: i64,
  pub reward_points:    i64,
  pub is_completed:     bool,
  pub created_at:       String,
  pub expires_at:       String,
  pub completed_at:     Option<String>,
}

impl RawChallenge {
  pub fn into_challenge(self) -> Result<Challenge> {
    Ok(Challenge {
      challenge_id:     decode_uuid(&self.challenge_id)?,
      user_id:          decode_uuid(&self.user_id)?,
      title:            self.title,
      description:      self.description,
      target_value:     self.target_value,
      current_progress: self.current_progress,
      reward_points:    self.reward_points,
      is_completed:     self.is_completed,
      created_at:       decode_dt(&self.created_at)?,
      expires_at:       decode_dt(&self.expires_at)?,
      completed_at:     self
        .completed_at
        .as_deref()
        .map(decode_dt)
        .transpose()?,
    })
  }
}
