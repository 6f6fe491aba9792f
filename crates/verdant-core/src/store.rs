//! The `RewardLedger` trait and supporting types.
//!
//! The trait is implemented by storage backends (e.g.
//! `verdant-store-sqlite`). Higher layers (`verdant-api`,
//! `verdant-server`) depend on this abstraction, not on any concrete
//! backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  activity::{ActivitySubmission, NewSubmission, SubmissionStatus},
  badge::{BadgeKind, UserBadge},
  challenge::{Challenge, NewChallenge},
  ledger::LedgerEntry,
  profile::{ProfileView, User},
  reward::RewardResult,
};

// ─── Error classification ────────────────────────────────────────────────────

/// Bound on backend error types that lets callers recover the domain error
/// (if any) behind a backend failure, e.g. to choose an HTTP status.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  /// The [`crate::Error`] this failure wraps, or `None` for
  /// infrastructure failures (I/O, connection loss).
  fn as_core(&self) -> Option<&crate::Error>;
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Verdant reward-ledger backend.
///
/// The ledger table is append-only; aggregates are only ever written by
/// full recomputation over it. Every mutating operation that touches the
/// ledger (`approve`, `report_progress`, `record_external_reward`) must be
/// atomic: it either applies completely — state flip, ledger append,
/// aggregate recompute, badge evaluation — or not at all.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait RewardLedger: Send + Sync {
  type Error: StoreError;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Create a user together with its (zeroed) aggregate profile row.
  fn add_user(
    &self,
    display_name: String,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Retrieve a user by UUID. Returns `None` if not found.
  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  fn list_users(
    &self,
  ) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + '_;

  // ── Submissions ───────────────────────────────────────────────────────

  /// Record a new Pending submission. `submitted_at` is set by the store.
  fn submit(
    &self,
    input: NewSubmission,
  ) -> impl Future<Output = Result<ActivitySubmission, Self::Error>> + Send + '_;

  fn get_submission(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<ActivitySubmission>, Self::Error>> + Send + '_;

  /// List a user's submissions, newest first, optionally filtered by
  /// status.
  fn list_submissions(
    &self,
    user_id: Uuid,
    status: Option<SubmissionStatus>,
  ) -> impl Future<Output = Result<Vec<ActivitySubmission>, Self::Error>> + Send + '_;

  /// The core transactional operation: approve a Pending submission.
  ///
  /// Computes the reward, flips the submission to Approved, appends one
  /// ledger entry, recomputes the user's aggregates from the full ledger,
  /// and evaluates badges — all in one transaction. A non-Pending
  /// submission fails with
  /// [`InvalidStateTransition`](crate::Error::InvalidStateTransition) and
  /// no side effects.
  fn approve(
    &self,
    submission_id: Uuid,
  ) -> impl Future<Output = Result<RewardResult, Self::Error>> + Send + '_;

  /// Reject a Pending submission with reviewer feedback. No reward, no
  /// ledger entry. Same transition rules as [`RewardLedger::approve`].
  fn reject(
    &self,
    submission_id: Uuid,
    feedback: String,
  ) -> impl Future<Output = Result<ActivitySubmission, Self::Error>> + Send + '_;

  // ── Aggregates & badges ───────────────────────────────────────────────

  /// The user's cached totals with the level fields derived on read.
  fn get_aggregates(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<ProfileView, Self::Error>> + Send + '_;

  /// Badges held by the user, in the order they were earned.
  fn list_badges(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<UserBadge>, Self::Error>> + Send + '_;

  /// The user's ledger entries, newest first.
  fn list_ledger(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<LedgerEntry>, Self::Error>> + Send + '_;

  /// The shared reward-credit primitive for non-submission rewards (event
  /// attendance and the like): appends a ledger entry with no submission
  /// back-reference, recomputes aggregates, evaluates badges. Atomic.
  fn record_external_reward(
    &self,
    user_id: Uuid,
    points: i64,
    carbon_saved_kg: f64,
    note: Option<String>,
  ) -> impl Future<Output = Result<LedgerEntry, Self::Error>> + Send + '_;

  /// Update the engagement counters fed by the external event and team
  /// collaborators, then evaluate badges. Returns the badges first
  /// awarded by this call.
  fn record_engagement(
    &self,
    user_id: Uuid,
    events_attended: i64,
    has_team: bool,
  ) -> impl Future<Output = Result<Vec<BadgeKind>, Self::Error>> + Send + '_;

  // ── Challenges ────────────────────────────────────────────────────────

  fn create_challenge(
    &self,
    input: NewChallenge,
  ) -> impl Future<Output = Result<Challenge, Self::Error>> + Send + '_;

  fn get_challenge(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Challenge>, Self::Error>> + Send + '_;

  /// List a user's challenges, newest first.
  fn list_challenges(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Challenge>, Self::Error>> + Send + '_;

  /// Apply an incremental progress report (the running total is clamped
  /// into `[0, target]`). The first report to reach the target completes
  /// the challenge and credits its reward points through the ledger,
  /// exactly once. Atomic.
  fn report_progress(
    &self,
    challenge_id: Uuid,
    value: i64,
  ) -> impl Future<Output = Result<Challenge, Self::Error>> + Send + '_;
}
