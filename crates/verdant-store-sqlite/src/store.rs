//! [`SqliteLedger`] — the SQLite implementation of [`RewardLedger`].
//!
//! Every reward-affecting operation (`approve`, `report_progress`,
//! `record_external_reward`, `record_engagement`) runs its whole
//! read-check-write-recompute-award sequence inside one SQLite
//! transaction. Aggregate recomputation always happens after the ledger
//! append in the same transaction, so it sees its own write; any failure
//! rolls the entire step back.

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use verdant_core::{
  Error as CoreError,
  activity::{ActivitySubmission, KindTotals, NewSubmission, SubmissionStatus},
  badge::{self, AggregateSnapshot, BadgeKind, UserBadge},
  challenge::{Challenge, NewChallenge},
  ledger::LedgerEntry,
  profile::{Level, ProfileView, User},
  reward::{self, RewardResult},
  store::RewardLedger,
};

use crate::{
  Error, Result,
  encode::{
    RawBadge, RawChallenge, RawLedgerEntry, RawSubmission, RawUser,
    decode_kind, decode_status, encode_badge_kind, encode_dt, encode_kind,
    encode_status, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Verdant reward ledger backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All
/// mutations serialize through that one connection, which is what makes
/// concurrent approvals for the same user safe: each runs as one
/// transaction against a consistent view of the ledger.
#[derive(Clone)]
pub struct SqliteLedger {
  conn: tokio_rusqlite::Connection,
}

impl SqliteLedger {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  #[cfg(test)]
  pub(crate) fn raw_conn(&self) -> &tokio_rusqlite::Connection { &self.conn }
}

// ─── In-transaction helpers ──────────────────────────────────────────────────

/// Wrap a decode failure so it can cross the `tokio_rusqlite` closure
/// boundary (it rolls the surrounding transaction back like any other
/// error).
fn db_other(e: Error) -> tokio_rusqlite::Error {
  tokio_rusqlite::Error::Other(Box::new(e))
}

fn fetch_submission(
  conn: &rusqlite::Connection,
  id_str: &str,
) -> rusqlite::Result<Option<RawSubmission>> {
  conn
    .query_row(
      "SELECT submission_id, user_id, kind, quantity, description,
              evidence_ref, status, points_awarded, carbon_saved_kg,
              submitted_at, feedback
       FROM submissions WHERE submission_id = ?1",
      rusqlite::params![id_str],
      |row| {
        Ok(RawSubmission {
          submission_id:   row.get(0)?,
          user_id:         row.get(1)?,
          kind:            row.get(2)?,
          quantity:        row.get(3)?,
          description:     row.get(4)?,
          evidence_ref:    row.get(5)?,
          status:          row.get(6)?,
          points_awarded:  row.get(7)?,
          carbon_saved_kg: row.get(8)?,
          submitted_at:    row.get(9)?,
          feedback:        row.get(10)?,
        })
      },
    )
    .optional()
}

fn fetch_challenge(
  conn: &rusqlite::Connection,
  id_str: &str,
) -> rusqlite::Result<Option<RawChallenge>> {
  conn
    .query_row(
      "SELECT challenge_id, user_id, title, description, target_value,
              current_progress, reward_points, is_completed, created_at,
              expires_at, completed_at
       FROM challenges WHERE challenge_id = ?1",
      rusqlite::params![id_str],
      |row| {
        Ok(RawChallenge {
          challenge_id:     row.get(0)?,
          user_id:          row.get(1)?,
          title:            row.get(2)?,
          description:      row.get(3)?,
          target_value:     row.get(4)?,
          current_progress: row.get(5)?,
          reward_points:    row.get(6)?,
          is_completed:     row.get(7)?,
          created_at:       row.get(8)?,
          expires_at:       row.get(9)?,
          completed_at:     row.get(10)?,
        })
      },
    )
    .optional()
}

fn user_exists(
  conn: &rusqlite::Connection,
  user_id_str: &str,
) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM users WHERE user_id = ?1",
        rusqlite::params![user_id_str],
        |_| Ok(true),
      )
      .optional()?
      .unwrap_or(false),
  )
}

/// Append one ledger row. The only INSERT path into the ledger table.
fn append_ledger(
  conn: &rusqlite::Connection,
  user_id_str: &str,
  submission_id_str: Option<&str>,
  carbon_saved_kg: f64,
  points_earned: i64,
  note: Option<&str>,
) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO ledger (entry_id, user_id, submission_id, carbon_saved_kg,
                         points_earned, note, recorded_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    rusqlite::params![
      encode_uuid(Uuid::new_v4()),
      user_id_str,
      submission_id_str,
      carbon_saved_kg,
      points_earned,
      note,
      encode_dt(Utc::now()),
    ],
  )?;
  Ok(())
}

/// Recompute the user's cached totals as a full sum over their ledger rows
/// and persist them. Deterministic and idempotent; the only write path for
/// the aggregate columns.
fn recompute_aggregates(
  conn: &rusqlite::Connection,
  user_id_str: &str,
) -> std::result::Result<(i64, f64), tokio_rusqlite::Error> {
  let (points, carbon): (i64, f64) = conn.query_row(
    "SELECT COALESCE(SUM(points_earned), 0),
            COALESCE(SUM(carbon_saved_kg), 0.0)
     FROM ledger WHERE user_id = ?1",
    rusqlite::params![user_id_str],
    |row| Ok((row.get(0)?, row.get(1)?)),
  )?;

  let updated = conn.execute(
    "UPDATE profiles SET total_points = ?2, total_carbon_saved = ?3
     WHERE user_id = ?1",
    rusqlite::params![user_id_str, points, carbon],
  )?;
  if updated != 1 {
    return Err(tokio_rusqlite::Error::Other(
      format!("aggregate row missing for user {user_id_str}").into(),
    ));
  }

  Ok((points, carbon))
}

/// Build the user's aggregate snapshot, run the pure qualification rules,
/// and insert every qualifying badge with `INSERT OR IGNORE`. Returns the
/// badges that were actually new. Safe to call on every approval.
fn evaluate_badges(
  conn: &rusqlite::Connection,
  user_id_str: &str,
) -> std::result::Result<Vec<BadgeKind>, tokio_rusqlite::Error> {
  let (total_points, events_attended, has_team): (i64, i64, bool) = conn
    .query_row(
      "SELECT total_points, events_attended, has_team
       FROM profiles WHERE user_id = ?1",
      rusqlite::params![user_id_str],
      |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
    )?;

  let mut kind_totals = KindTotals::default();
  {
    let mut stmt = conn.prepare(
      "SELECT kind, COALESCE(SUM(quantity), 0.0)
       FROM submissions
       WHERE user_id = ?1 AND status = ?2
       GROUP BY kind",
    )?;
    let rows = stmt.query_map(
      rusqlite::params![user_id_str, encode_status(SubmissionStatus::Approved)],
      |row| Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?)),
    )?;
    for row in rows {
      let (kind_str, total) = row?;
      let kind = decode_kind(&kind_str).map_err(db_other)?;
      kind_totals.add(kind, total);
    }
  }

  let snapshot = AggregateSnapshot {
    total_points,
    kind_totals,
    events_attended,
    has_team,
  };

  let mut newly_awarded = Vec::new();
  for (kind, description) in badge::qualified(&snapshot) {
    let inserted = conn.execute(
      "INSERT OR IGNORE INTO badges (user_id, kind, earned_at, description)
       VALUES (?1, ?2, ?3, ?4)",
      rusqlite::params![
        user_id_str,
        encode_badge_kind(kind),
        encode_dt(Utc::now()),
        description,
      ],
    )?;
    if inserted == 1 {
      newly_awarded.push(kind);
    }
  }

  Ok(newly_awarded)
}

// ─── RewardLedger impl ───────────────────────────────────────────────────────

impl RewardLedger for SqliteLedger {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn add_user(&self, display_name: String) -> Result<User> {
    let user = User {
      user_id: Uuid::new_v4(),
      display_name,
      created_at: Utc::now(),
    };

    let id_str = encode_uuid(user.user_id);
    let at_str = encode_dt(user.created_at);
    let name = user.display_name.clone();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO users (user_id, display_name, created_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![id_str, name, at_str],
        )?;
        tx.execute(
          "INSERT INTO profiles (user_id) VALUES (?1)",
          rusqlite::params![id_str],
        )?;
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(user)
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, display_name, created_at FROM users
               WHERE user_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawUser {
                  user_id:      row.get(0)?,
                  display_name: row.get(1)?,
                  created_at:   row.get(2)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn list_users(&self) -> Result<Vec<User>> {
    let raws: Vec<RawUser> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT user_id, display_name, created_at FROM users
           ORDER BY created_at",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawUser {
              user_id:      row.get(0)?,
              display_name: row.get(1)?,
              created_at:   row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawUser::into_user).collect()
  }

  // ── Submissions ───────────────────────────────────────────────────────────

  async fn submit(&self, input: NewSubmission) -> Result<ActivitySubmission> {
    // Mirrors the CHECK constraint so bad input fails as a domain error,
    // not a bare SQLite error.
    if !input.quantity.is_finite() || input.quantity <= 0.0 {
      return Err(Error::Core(CoreError::InvalidQuantity(input.quantity)));
    }

    let submission = ActivitySubmission {
      submission_id:   Uuid::new_v4(),
      user_id:         input.user_id,
      kind:            input.kind,
      quantity:        input.quantity,
      description:     input.description,
      evidence_ref:    input.evidence_ref,
      status:          SubmissionStatus::Pending,
      points_awarded:  0,
      carbon_saved_kg: 0.0,
      submitted_at:    Utc::now(),
      feedback:        String::new(),
    };

    let id_str = encode_uuid(submission.submission_id);
    let user_id = submission.user_id;
    let user_id_str = encode_uuid(submission.user_id);
    let kind_str = encode_kind(submission.kind).to_owned();
    let quantity = submission.quantity;
    let description = submission.description.clone();
    let evidence_ref = submission.evidence_ref.clone();
    let at_str = encode_dt(submission.submitted_at);

    let inner: std::result::Result<(), CoreError> = self
      .conn
      .call(move |conn| {
        if !user_exists(conn, &user_id_str)? {
          return Ok(Err(CoreError::UserNotFound(user_id)));
        }
        conn.execute(
          "INSERT INTO submissions (submission_id, user_id, kind, quantity,
                                    description, evidence_ref, status,
                                    submitted_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'pending', ?7)",
          rusqlite::params![
            id_str,
            user_id_str,
            kind_str,
            quantity,
            description,
            evidence_ref,
            at_str,
          ],
        )?;
        Ok(Ok(()))
      })
      .await?;

    inner.map_err(Error::Core)?;
    Ok(submission)
  }

  async fn get_submission(&self, id: Uuid) -> Result<Option<ActivitySubmission>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawSubmission> = self
      .conn
      .call(move |conn| Ok(fetch_submission(conn, &id_str)?))
      .await?;

    raw.map(RawSubmission::into_submission).transpose()
  }

  async fn list_submissions(
    &self,
    user_id: Uuid,
    status: Option<SubmissionStatus>,
  ) -> Result<Vec<ActivitySubmission>> {
    let user_id_str = encode_uuid(user_id);
    let status_str = status.map(encode_status).map(str::to_owned);

    let raws: Vec<RawSubmission> = self
      .conn
      .call(move |conn| {
        let map_row = |row: &rusqlite::Row<'_>| {
          Ok(RawSubmission {
            submission_id:   row.get(0)?,
            user_id:         row.get(1)?,
            kind:            row.get(2)?,
            quantity:        row.get(3)?,
            description:     row.get(4)?,
            evidence_ref:    row.get(5)?,
            status:          row.get(6)?,
            points_awarded:  row.get(7)?,
            carbon_saved_kg: row.get(8)?,
            submitted_at:    row.get(9)?,
            feedback:        row.get(10)?,
          })
        };

        let rows = if let Some(s) = status_str {
          let mut stmt = conn.prepare(
            "SELECT submission_id, user_id, kind, quantity, description,
                    evidence_ref, status, points_awarded, carbon_saved_kg,
                    submitted_at, feedback
             FROM submissions
             WHERE user_id = ?1 AND status = ?2
             ORDER BY submitted_at DESC, rowid DESC",
          )?;
          stmt
            .query_map(rusqlite::params![user_id_str, s], map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(
            "SELECT submission_id, user_id, kind, quantity, description,
                    evidence_ref, status, points_awarded, carbon_saved_kg,
                    submitted_at, feedback
             FROM submissions
             WHERE user_id = ?1
             ORDER BY submitted_at DESC, rowid DESC",
          )?;
          stmt
            .query_map(rusqlite::params![user_id_str], map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawSubmission::into_submission)
      .collect()
  }

  async fn approve(&self, submission_id: Uuid) -> Result<RewardResult> {
    let id_str = encode_uuid(submission_id);

    let inner: std::result::Result<RewardResult, CoreError> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let Some(raw) = fetch_submission(&tx, &id_str)? else {
          return Ok(Err(CoreError::SubmissionNotFound(submission_id)));
        };
        let status = decode_status(&raw.status).map_err(db_other)?;
        if status != SubmissionStatus::Pending {
          return Ok(Err(CoreError::InvalidStateTransition {
            submission: submission_id,
            status,
          }));
        }

        let kind = decode_kind(&raw.kind).map_err(db_other)?;
        let points = reward::points_for(raw.quantity);
        let carbon = reward::carbon_for(kind, raw.quantity);

        tx.execute(
          "UPDATE submissions
           SET status = ?2, points_awarded = ?3, carbon_saved_kg = ?4
           WHERE submission_id = ?1",
          rusqlite::params![
            id_str,
            encode_status(SubmissionStatus::Approved),
            points,
            carbon,
          ],
        )?;

        append_ledger(&tx, &raw.user_id, Some(&id_str), carbon, points, None)?;
        recompute_aggregates(&tx, &raw.user_id)?;
        let new_badges = evaluate_badges(&tx, &raw.user_id)?;

        tx.commit()?;
        Ok(Ok(RewardResult {
          points,
          carbon_saved_kg: carbon,
          new_badges,
        }))
      })
      .await?;

    inner.map_err(Error::Core)
  }

  async fn reject(
    &self,
    submission_id: Uuid,
    feedback: String,
  ) -> Result<ActivitySubmission> {
    let id_str = encode_uuid(submission_id);
    let rejected_str = encode_status(SubmissionStatus::Rejected).to_owned();

    let inner: std::result::Result<RawSubmission, CoreError> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let Some(mut raw) = fetch_submission(&tx, &id_str)? else {
          return Ok(Err(CoreError::SubmissionNotFound(submission_id)));
        };
        let status = decode_status(&raw.status).map_err(db_other)?;
        if status != SubmissionStatus::Pending {
          return Ok(Err(CoreError::InvalidStateTransition {
            submission: submission_id,
            status,
          }));
        }

        tx.execute(
          "UPDATE submissions SET status = ?2, feedback = ?3
           WHERE submission_id = ?1",
          rusqlite::params![id_str, rejected_str, feedback],
        )?;
        tx.commit()?;

        raw.status = rejected_str;
        raw.feedback = feedback;
        Ok(Ok(raw))
      })
      .await?;

    inner.map_err(Error::Core)?.into_submission()
  }

  // ── Aggregates & badges ───────────────────────────────────────────────────

  async fn get_aggregates(&self, user_id: Uuid) -> Result<ProfileView> {
    let id_str = encode_uuid(user_id);

    let raw: Option<(RawUser, i64, f64)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT u.user_id, u.display_name, u.created_at,
                      p.total_points, p.total_carbon_saved
               FROM users u
               JOIN profiles p ON p.user_id = u.user_id
               WHERE u.user_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok((
                  RawUser {
                    user_id:      row.get(0)?,
                    display_name: row.get(1)?,
                    created_at:   row.get(2)?,
                  },
                  row.get(3)?,
                  row.get(4)?,
                ))
              },
            )
            .optional()?,
        )
      })
      .await?;

    let Some((raw_user, total_points, total_carbon_saved)) = raw else {
      return Err(Error::Core(CoreError::UserNotFound(user_id)));
    };

    Ok(ProfileView {
      user: raw_user.into_user()?,
      total_points,
      total_carbon_saved,
      current_level: Level::for_points(total_points),
      points_to_next: Level::points_to_next(total_points),
      level_progress: Level::progress_percent(total_points),
    })
  }

  async fn list_badges(&self, user_id: Uuid) -> Result<Vec<UserBadge>> {
    let id_str = encode_uuid(user_id);

    let raws: Vec<RawBadge> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT user_id, kind, earned_at, description FROM badges
           WHERE user_id = ?1
           ORDER BY earned_at, rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawBadge {
              user_id:     row.get(0)?,
              kind:        row.get(1)?,
              earned_at:   row.get(2)?,
              description: row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawBadge::into_badge).collect()
  }

  async fn list_ledger(&self, user_id: Uuid) -> Result<Vec<LedgerEntry>> {
    let id_str = encode_uuid(user_id);

    let raws: Vec<RawLedgerEntry> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT entry_id, user_id, submission_id, carbon_saved_kg,
                  points_earned, note, recorded_at
           FROM ledger
           WHERE user_id = ?1
           ORDER BY recorded_at DESC, rowid DESC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawLedgerEntry {
              entry_id:        row.get(0)?,
              user_id:         row.get(1)?,
              submission_id:   row.get(2)?,
              carbon_saved_kg: row.get(3)?,
              points_earned:   row.get(4)?,
              note:            row.get(5)?,
              recorded_at:     row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLedgerEntry::into_entry).collect()
  }

  async fn record_external_reward(
    &self,
    user_id: Uuid,
    points: i64,
    carbon_saved_kg: f64,
    note: Option<String>,
  ) -> Result<LedgerEntry> {
    if points < 0 {
      return Err(Error::Core(CoreError::InvalidPoints(points)));
    }

    let entry = LedgerEntry {
      entry_id: Uuid::new_v4(),
      user_id,
      submission_id: None,
      carbon_saved_kg,
      points_earned: points,
      note,
      recorded_at: Utc::now(),
    };

    let entry_id_str = encode_uuid(entry.entry_id);
    let user_id_str = encode_uuid(user_id);
    let at_str = encode_dt(entry.recorded_at);
    let note_clone = entry.note.clone();

    let inner: std::result::Result<(), CoreError> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        if !user_exists(&tx, &user_id_str)? {
          return Ok(Err(CoreError::UserNotFound(user_id)));
        }

        tx.execute(
          "INSERT INTO ledger (entry_id, user_id, submission_id,
                               carbon_saved_kg, points_earned, note,
                               recorded_at)
           VALUES (?1, ?2, NULL, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            entry_id_str,
            user_id_str,
            carbon_saved_kg,
            points,
            note_clone,
            at_str,
          ],
        )?;
        recompute_aggregates(&tx, &user_id_str)?;
        evaluate_badges(&tx, &user_id_str)?;

        tx.commit()?;
        Ok(Ok(()))
      })
      .await?;

    inner.map_err(Error::Core)?;
    Ok(entry)
  }

  async fn record_engagement(
    &self,
    user_id: Uuid,
    events_attended: i64,
    has_team: bool,
  ) -> Result<Vec<BadgeKind>> {
    let id_str = encode_uuid(user_id);

    let inner: std::result::Result<Vec<BadgeKind>, CoreError> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let updated = tx.execute(
          "UPDATE profiles SET events_attended = ?2, has_team = ?3
           WHERE user_id = ?1",
          rusqlite::params![id_str, events_attended, has_team],
        )?;
        if updated != 1 {
          return Ok(Err(CoreError::UserNotFound(user_id)));
        }

        let newly_awarded = evaluate_badges(&tx, &id_str)?;
        tx.commit()?;
        Ok(Ok(newly_awarded))
      })
      .await?;

    inner.map_err(Error::Core)
  }

  // ── Challenges ────────────────────────────────────────────────────────────

  async fn create_challenge(&self, input: NewChallenge) -> Result<Challenge> {
    // Mirrors the CHECK constraints; see submit().
    if input.target_value <= 0 {
      return Err(Error::Core(CoreError::InvalidTarget(input.target_value)));
    }
    if input.reward_points < 0 {
      return Err(Error::Core(CoreError::InvalidPoints(input.reward_points)));
    }

    let challenge = Challenge {
      challenge_id:     Uuid::new_v4(),
      user_id:          input.user_id,
      title:            input.title,
      description:      input.description,
      target_value:     input.target_value,
      current_progress: 0,
      reward_points:    input.reward_points,
      is_completed:     false,
      created_at:       Utc::now(),
      expires_at:       input.expires_at,
      completed_at:     None,
    };

    let id_str = encode_uuid(challenge.challenge_id);
    let user_id = challenge.user_id;
    let user_id_str = encode_uuid(challenge.user_id);
    let title = challenge.title.clone();
    let description = challenge.description.clone();
    let target_value = challenge.target_value;
    let reward_points = challenge.reward_points;
    let created_str = encode_dt(challenge.created_at);
    let expires_str = encode_dt(challenge.expires_at);

    let inner: std::result::Result<(), CoreError> = self
      .conn
      .call(move |conn| {
        if !user_exists(conn, &user_id_str)? {
          return Ok(Err(CoreError::UserNotFound(user_id)));
        }
        conn.execute(
          "INSERT INTO challenges (challenge_id, user_id, title, description,
                                   target_value, current_progress,
                                   reward_points, is_completed, created_at,
                                   expires_at)
           VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, 0, ?7, ?8)",
          rusqlite::params![
            id_str,
            user_id_str,
            title,
            description,
            target_value,
            reward_points,
            created_str,
            expires_str,
          ],
        )?;
        Ok(Ok(()))
      })
      .await?;

    inner.map_err(Error::Core)?;
    Ok(challenge)
  }

  async fn get_challenge(&self, id: Uuid) -> Result<Option<Challenge>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawChallenge> = self
      .conn
      .call(move |conn| Ok(fetch_challenge(conn, &id_str)?))
      .await?;

    raw.map(RawChallenge::into_challenge).transpose()
  }

  async fn list_challenges(&self, user_id: Uuid) -> Result<Vec<Challenge>> {
    let id_str = encode_uuid(user_id);

    let raws: Vec<RawChallenge> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT challenge_id, user_id, title, description, target_value,
                  current_progress, reward_points, is_completed, created_at,
                  expires_at, completed_at
           FROM challenges
           WHERE user_id = ?1
           ORDER BY created_at DESC, rowid DESC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawChallenge {
              challenge_id:     row.get(0)?,
              user_id:          row.get(1)?,
              title:            row.get(2)?,
              description:      row.get(3)?,
              target_value:     row.get(4)?,
              current_progress: row.get(5)?,
              reward_points:    row.get(6)?,
              is_completed:     row.get(7)?,
              created_at:       row.get(8)?,
              expires_at:       row.get(9)?,
              completed_at:     row.get(10)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawChallenge::into_challenge)
      .collect()
  }

  async fn report_progress(
    &self,
    challenge_id: Uuid,
    value: i64,
  ) -> Result<Challenge> {
    let id_str = encode_uuid(challenge_id);

    let inner: std::result::Result<Challenge, CoreError> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let Some(raw) = fetch_challenge(&tx, &id_str)? else {
          return Ok(Err(CoreError::ChallengeNotFound(challenge_id)));
        };
        let challenge = raw.into_challenge().map_err(db_other)?;

        let outcome = challenge.apply_progress(value, Utc::now());
        let challenge = outcome.challenge;

        tx.execute(
          "UPDATE challenges
           SET current_progress = ?2, is_completed = ?3, completed_at = ?4
           WHERE challenge_id = ?1",
          rusqlite::params![
            id_str,
            challenge.current_progress,
            challenge.is_completed,
            challenge.completed_at.map(encode_dt),
          ],
        )?;

        if outcome.newly_completed {
          // The single reward credit, audited like every other reward:
          // through the ledger, then recompute + badge pass.
          let user_id_str = encode_uuid(challenge.user_id);
          let note = format!("Challenge reward: {}", challenge.title);
          append_ledger(
            &tx,
            &user_id_str,
            None,
            0.0,
            challenge.reward_points,
            Some(&note),
          )?;
          recompute_aggregates(&tx, &user_id_str)?;
          evaluate_badges(&tx, &user_id_str)?;
        }

        tx.commit()?;
        Ok(Ok(challenge))
      })
      .await?;

    inner.map_err(Error::Core)
  }
}
