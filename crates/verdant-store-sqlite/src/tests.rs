//! Integration tests for `SqliteLedger` against an in-memory database.

use chrono::{Duration, Utc};
use uuid::Uuid;
use verdant_core::{
  activity::{ActivityKind, NewSubmission, SubmissionStatus},
  badge::BadgeKind,
  challenge::NewChallenge,
  profile::Level,
  store::RewardLedger,
};

use crate::SqliteLedger;

async fn store() -> SqliteLedger {
  SqliteLedger::open_in_memory()
    .await
    .expect("in-memory store")
}

fn submission(user_id: Uuid, kind: ActivityKind, quantity: f64) -> NewSubmission {
  NewSubmission::new(user_id, kind, quantity, "test submission", None)
    .expect("valid submission")
}

fn challenge(user_id: Uuid, target: i64, reward: i64) -> NewChallenge {
  NewChallenge::new(
    user_id,
    "Weekly push",
    "opaque generated text",
    target,
    reward,
    Utc::now() + Duration::days(7),
  )
  .expect("valid challenge")
}

/// Submit-and-approve in one step; returns the awarded points.
async fn approve_new(
  s: &SqliteLedger,
  user_id: Uuid,
  kind: ActivityKind,
  quantity: f64,
) -> i64 {
  let sub = s.submit(submission(user_id, kind, quantity)).await.unwrap();
  s.approve(sub.submission_id).await.unwrap().points
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_user() {
  let s = store().await;

  let user = s.add_user("Farida".into()).await.unwrap();
  let fetched = s.get_user(user.user_id).await.unwrap().unwrap();
  assert_eq!(fetched.user_id, user.user_id);
  assert_eq!(fetched.display_name, "Farida");
}

#[tokio::test]
async fn get_user_missing_returns_none() {
  let s = store().await;
  assert!(s.get_user(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn new_user_has_zeroed_aggregates() {
  let s = store().await;
  let user = s.add_user("Omar".into()).await.unwrap();

  let view = s.get_aggregates(user.user_id).await.unwrap();
  assert_eq!(view.total_points, 0);
  assert_eq!(view.total_carbon_saved, 0.0);
  assert_eq!(view.current_level, Level::Newbie);
  assert_eq!(view.points_to_next, 50);
}

// ─── Submission & approval ───────────────────────────────────────────────────

#[tokio::test]
async fn approve_tree_plantation_computes_reward() {
  let s = store().await;
  let user = s.add_user("Ana".into()).await.unwrap();

  let sub = s
    .submit(submission(user.user_id, ActivityKind::TreePlantation, 5.0))
    .await
    .unwrap();
  assert_eq!(sub.status, SubmissionStatus::Pending);
  assert_eq!(sub.points_awarded, 0);

  let reward = s.approve(sub.submission_id).await.unwrap();
  assert_eq!(reward.points, 50);
  assert_eq!(reward.carbon_saved_kg, 110.0);

  let approved = s
    .get_submission(sub.submission_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(approved.status, SubmissionStatus::Approved);
  assert_eq!(approved.points_awarded, 50);
  assert_eq!(approved.carbon_saved_kg, 110.0);

  // Exactly one ledger row, referencing the submission.
  let ledger = s.list_ledger(user.user_id).await.unwrap();
  assert_eq!(ledger.len(), 1);
  assert_eq!(ledger[0].submission_id, Some(sub.submission_id));
  assert_eq!(ledger[0].points_earned, 50);
  assert_eq!(ledger[0].carbon_saved_kg, 110.0);

  let view = s.get_aggregates(user.user_id).await.unwrap();
  assert_eq!(view.total_points, 50);
  assert_eq!(view.total_carbon_saved, 110.0);
  assert_eq!(view.current_level, Level::Bronze);
}

#[tokio::test]
async fn approve_twice_is_invalid_and_leaves_no_trace() {
  let s = store().await;
  let user = s.add_user("Bea".into()).await.unwrap();

  let sub = s
    .submit(submission(user.user_id, ActivityKind::Recycling, 4.0))
    .await
    .unwrap();
  s.approve(sub.submission_id).await.unwrap();

  let err = s.approve(sub.submission_id).await.unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(verdant_core::Error::InvalidStateTransition { .. })
  ));

  // No second ledger row, unchanged reward fields.
  assert_eq!(s.list_ledger(user.user_id).await.unwrap().len(), 1);
  let after = s
    .get_submission(sub.submission_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(after.points_awarded, 40);
  assert_eq!(s.get_aggregates(user.user_id).await.unwrap().total_points, 40);
}

#[tokio::test]
async fn reject_sets_feedback_and_no_ledger_row() {
  let s = store().await;
  let user = s.add_user("Kai".into()).await.unwrap();

  let sub = s
    .submit(submission(user.user_id, ActivityKind::CleanupDrive, 3.0))
    .await
    .unwrap();
  let rejected = s
    .reject(sub.submission_id, "needs better evidence".into())
    .await
    .unwrap();

  assert_eq!(rejected.status, SubmissionStatus::Rejected);
  assert_eq!(rejected.feedback, "needs better evidence");
  assert_eq!(rejected.points_awarded, 0);
  assert!(s.list_ledger(user.user_id).await.unwrap().is_empty());

  // Rejection is terminal too.
  let err = s.approve(sub.submission_id).await.unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(verdant_core::Error::InvalidStateTransition { .. })
  ));
}

#[tokio::test]
async fn approve_missing_submission_errors() {
  let s = store().await;
  let err = s.approve(Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(verdant_core::Error::SubmissionNotFound(_))
  ));
}

#[tokio::test]
async fn submit_rejects_non_positive_quantity() {
  let s = store().await;
  let user = s.add_user("Lin".into()).await.unwrap();

  let bad = NewSubmission {
    user_id:      user.user_id,
    kind:         ActivityKind::Recycling,
    quantity:     0.0,
    description:  String::new(),
    evidence_ref: None,
  };
  let err = s.submit(bad).await.unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(verdant_core::Error::InvalidQuantity(_))
  ));
}

#[tokio::test]
async fn list_submissions_filters_by_status() {
  let s = store().await;
  let user = s.add_user("Noor".into()).await.unwrap();

  let a = s
    .submit(submission(user.user_id, ActivityKind::Recycling, 1.0))
    .await
    .unwrap();
  let b = s
    .submit(submission(user.user_id, ActivityKind::Recycling, 2.0))
    .await
    .unwrap();
  s.submit(submission(user.user_id, ActivityKind::Recycling, 3.0))
    .await
    .unwrap();

  s.approve(a.submission_id).await.unwrap();
  s.reject(b.submission_id, "blurry photo".into()).await.unwrap();

  let all = s.list_submissions(user.user_id, None).await.unwrap();
  assert_eq!(all.len(), 3);

  let pending = s
    .list_submissions(user.user_id, Some(SubmissionStatus::Pending))
    .await
    .unwrap();
  assert_eq!(pending.len(), 1);

  let approved = s
    .list_submissions(user.user_id, Some(SubmissionStatus::Approved))
    .await
    .unwrap();
  assert_eq!(approved.len(), 1);
  assert_eq!(approved[0].submission_id, a.submission_id);
}

// ─── Aggregates stay reconciled with the ledger ──────────────────────────────

#[tokio::test]
async fn aggregates_equal_ledger_sum_after_mixed_operations() {
  let s = store().await;
  let user = s.add_user("Sol".into()).await.unwrap();

  approve_new(&s, user.user_id, ActivityKind::Recycling, 10.0).await;
  approve_new(&s, user.user_id, ActivityKind::TreePlantation, 2.0).await;
  s.record_external_reward(user.user_id, 30, 0.0, Some("event attendance".into()))
    .await
    .unwrap();

  let ch = s.create_challenge(challenge(user.user_id, 5, 100)).await.unwrap();
  s.report_progress(ch.challenge_id, 5).await.unwrap();

  let ledger = s.list_ledger(user.user_id).await.unwrap();
  let sum_points: i64 = ledger.iter().map(|e| e.points_earned).sum();
  let sum_carbon: f64 = ledger.iter().map(|e| e.carbon_saved_kg).sum();

  let view = s.get_aggregates(user.user_id).await.unwrap();
  assert_eq!(view.total_points, sum_points);
  assert_eq!(view.total_carbon_saved, sum_carbon);
  // 100 + 20 + 30 + 100 points; 15 + 44 kg carbon.
  assert_eq!(view.total_points, 250);
  assert_eq!(view.total_carbon_saved, 59.0);
}

// ─── Badges ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn bronze_awarded_exactly_once_across_threshold() {
  let s = store().await;
  let user = s.add_user("Pia".into()).await.unwrap();

  // 0 → 30 points: no badge yet.
  approve_new(&s, user.user_id, ActivityKind::CleanupDrive, 3.0).await;
  assert!(s.list_badges(user.user_id).await.unwrap().is_empty());

  // 30 → 60 points: crosses 50 once.
  approve_new(&s, user.user_id, ActivityKind::CleanupDrive, 3.0).await;
  let badges = s.list_badges(user.user_id).await.unwrap();
  assert_eq!(badges.len(), 1);
  assert_eq!(badges[0].kind, BadgeKind::Bronze);

  // Further approvals never duplicate it.
  approve_new(&s, user.user_id, ActivityKind::CleanupDrive, 1.0).await;
  let badges = s.list_badges(user.user_id).await.unwrap();
  let bronze = badges.iter().filter(|b| b.kind == BadgeKind::Bronze).count();
  assert_eq!(bronze, 1);
}

#[tokio::test]
async fn point_jump_awards_all_level_badges_in_one_pass() {
  let s = store().await;
  let user = s.add_user("Rex".into()).await.unwrap();

  // 250 trees → 2500 points in a single approval.
  let reward =
    approve_new(&s, user.user_id, ActivityKind::TreePlantation, 250.0).await;
  assert_eq!(reward, 2500);

  let kinds: Vec<BadgeKind> = s
    .list_badges(user.user_id)
    .await
    .unwrap()
    .into_iter()
    .map(|b| b.kind)
    .collect();
  for kind in [
    BadgeKind::Bronze,
    BadgeKind::Silver,
    BadgeKind::Gold,
    BadgeKind::Platinum,
    BadgeKind::EcoChampion,
  ] {
    assert!(kinds.contains(&kind), "{kind:?} missing after jump");
  }
}

#[tokio::test]
async fn recycling_hero_waits_for_lifetime_threshold() {
  let s = store().await;
  let user = s.add_user("Tam".into()).await.unwrap();

  // 45 kg total: below the 50 kg threshold.
  approve_new(&s, user.user_id, ActivityKind::Recycling, 20.0).await;
  approve_new(&s, user.user_id, ActivityKind::Recycling, 25.0).await;
  let kinds: Vec<BadgeKind> = s
    .list_badges(user.user_id)
    .await
    .unwrap()
    .into_iter()
    .map(|b| b.kind)
    .collect();
  assert!(!kinds.contains(&BadgeKind::RecyclingHero));

  // One more 10 kg approval → 55 kg lifetime.
  let reward = s
    .approve(
      s.submit(submission(user.user_id, ActivityKind::Recycling, 10.0))
        .await
        .unwrap()
        .submission_id,
    )
    .await
    .unwrap();
  assert!(reward.new_badges.contains(&BadgeKind::RecyclingHero));
}

#[tokio::test]
async fn pending_and_rejected_submissions_do_not_count_towards_badges() {
  let s = store().await;
  let user = s.add_user("Uma".into()).await.unwrap();

  // 60 kg pending + 60 kg rejected; only 10 kg ever approved.
  s.submit(submission(user.user_id, ActivityKind::Recycling, 60.0))
    .await
    .unwrap();
  let rej = s
    .submit(submission(user.user_id, ActivityKind::Recycling, 60.0))
    .await
    .unwrap();
  s.reject(rej.submission_id, "no receipt".into()).await.unwrap();

  approve_new(&s, user.user_id, ActivityKind::Recycling, 10.0).await;

  let kinds: Vec<BadgeKind> = s
    .list_badges(user.user_id)
    .await
    .unwrap()
    .into_iter()
    .map(|b| b.kind)
    .collect();
  assert!(!kinds.contains(&BadgeKind::RecyclingHero));
}

#[tokio::test]
async fn engagement_badges_and_idempotent_re_evaluation() {
  let s = store().await;
  let user = s.add_user("Vik".into()).await.unwrap();

  let first = s.record_engagement(user.user_id, 5, true).await.unwrap();
  assert!(first.contains(&BadgeKind::EventParticipant));
  assert!(first.contains(&BadgeKind::TeamPlayer));

  // Same counters again: nothing new.
  let second = s.record_engagement(user.user_id, 5, true).await.unwrap();
  assert!(second.is_empty());
  assert_eq!(s.list_badges(user.user_id).await.unwrap().len(), 2);
}

// ─── External rewards ────────────────────────────────────────────────────────

#[tokio::test]
async fn external_reward_appends_ledger_and_recomputes() {
  let s = store().await;
  let user = s.add_user("Wes".into()).await.unwrap();

  let entry = s
    .record_external_reward(user.user_id, 60, 2.5, Some("campus fair".into()))
    .await
    .unwrap();
  assert!(entry.submission_id.is_none());

  let view = s.get_aggregates(user.user_id).await.unwrap();
  assert_eq!(view.total_points, 60);
  assert_eq!(view.total_carbon_saved, 2.5);
  assert_eq!(view.current_level, Level::Bronze);

  // The credit also feeds level badges.
  let kinds: Vec<BadgeKind> = s
    .list_badges(user.user_id)
    .await
    .unwrap()
    .into_iter()
    .map(|b| b.kind)
    .collect();
  assert!(kinds.contains(&BadgeKind::Bronze));
}

#[tokio::test]
async fn external_reward_rejects_negative_points() {
  let s = store().await;
  let user = s.add_user("Ned".into()).await.unwrap();

  let err = s
    .record_external_reward(user.user_id, -10, 0.0, None)
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(verdant_core::Error::InvalidPoints(-10))
  ));
  assert!(s.list_ledger(user.user_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn create_challenge_rejects_negative_reward() {
  let s = store().await;
  let user = s.add_user("Oli".into()).await.unwrap();

  let mut input = challenge(user.user_id, 10, 0);
  input.reward_points = -100;
  let err = s.create_challenge(input).await.unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(verdant_core::Error::InvalidPoints(-100))
  ));
}

#[tokio::test]
async fn external_reward_unknown_user_errors() {
  let s = store().await;
  let err = s
    .record_external_reward(Uuid::new_v4(), 10, 0.0, None)
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(verdant_core::Error::UserNotFound(_))
  ));
}

// ─── Challenges ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn overshoot_clamps_and_credits_once() {
  let s = store().await;
  let user = s.add_user("Yara".into()).await.unwrap();

  let ch = s
    .create_challenge(challenge(user.user_id, 100, 100))
    .await
    .unwrap();
  let updated = s.report_progress(ch.challenge_id, 150).await.unwrap();

  assert_eq!(updated.current_progress, 100);
  assert!(updated.is_completed);
  assert!(updated.completed_at.is_some());
  assert_eq!(s.get_aggregates(user.user_id).await.unwrap().total_points, 100);
}

#[tokio::test]
async fn split_reports_complete_once_without_double_credit() {
  let s = store().await;
  let user = s.add_user("Zed".into()).await.unwrap();

  let ch = s
    .create_challenge(challenge(user.user_id, 10, 100))
    .await
    .unwrap();

  let mid = s.report_progress(ch.challenge_id, 7).await.unwrap();
  assert_eq!(mid.current_progress, 7);
  assert!(!mid.is_completed);
  assert_eq!(s.get_aggregates(user.user_id).await.unwrap().total_points, 0);

  // 7 + 5 overshoots the target: clamp to 10, complete, credit 100.
  let done = s.report_progress(ch.challenge_id, 5).await.unwrap();
  assert_eq!(done.current_progress, 10);
  assert!(done.is_completed);
  assert_eq!(s.get_aggregates(user.user_id).await.unwrap().total_points, 100);

  // Reporting after completion never credits again.
  s.report_progress(ch.challenge_id, 3).await.unwrap();
  assert_eq!(s.get_aggregates(user.user_id).await.unwrap().total_points, 100);
  assert_eq!(s.list_ledger(user.user_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn huge_progress_report_clamps_and_credits_once() {
  let s = store().await;
  let user = s.add_user("Gil".into()).await.unwrap();

  let ch = s
    .create_challenge(challenge(user.user_id, 10, 100))
    .await
    .unwrap();
  s.report_progress(ch.challenge_id, 7).await.unwrap();

  let done = s.report_progress(ch.challenge_id, i64::MAX).await.unwrap();
  assert_eq!(done.current_progress, 10);
  assert!(done.is_completed);
  assert_eq!(s.get_aggregates(user.user_id).await.unwrap().total_points, 100);
}

#[tokio::test]
async fn expired_challenge_never_credits() {
  let s = store().await;
  let user = s.add_user("Ada".into()).await.unwrap();

  let mut input = challenge(user.user_id, 10, 100);
  input.expires_at = Utc::now() - Duration::hours(1);
  let ch = s.create_challenge(input).await.unwrap();

  let updated = s.report_progress(ch.challenge_id, 10).await.unwrap();
  assert_eq!(updated.current_progress, 10);
  assert!(!updated.is_completed);
  assert_eq!(s.get_aggregates(user.user_id).await.unwrap().total_points, 0);
}

#[tokio::test]
async fn report_progress_missing_challenge_errors() {
  let s = store().await;
  let err = s.report_progress(Uuid::new_v4(), 1).await.unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(verdant_core::Error::ChallengeNotFound(_))
  ));
}

// ─── Atomicity ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn failed_approval_rolls_back_completely() {
  let s = store().await;
  let user = s.add_user("Eli".into()).await.unwrap();
  let sub = s
    .submit(submission(user.user_id, ActivityKind::Recycling, 5.0))
    .await
    .unwrap();

  // Sabotage the aggregate step: with the profile row gone, recomputation
  // fails after the submission flip and ledger append have already run
  // inside the transaction.
  let id_str = user.user_id.hyphenated().to_string();
  s.raw_conn()
    .call(move |conn| {
      conn.execute(
        "DELETE FROM profiles WHERE user_id = ?1",
        rusqlite::params![id_str],
      )?;
      Ok(())
    })
    .await
    .unwrap();

  assert!(s.approve(sub.submission_id).await.is_err());

  // Nothing stuck halfway: still Pending, no ledger row.
  let after = s
    .get_submission(sub.submission_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(after.status, SubmissionStatus::Pending);
  assert_eq!(after.points_awarded, 0);
  assert!(s.list_ledger(user.user_id).await.unwrap().is_empty());
}
