//! Handlers for `/challenges` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/challenges` | Body: [`NewChallengeBody`]; returns 201 + challenge |
//! | `GET`  | `/challenges` | `?user_id` required |
//! | `GET`  | `/challenges/:id` | Single challenge |
//! | `POST` | `/challenges/:id/progress` | Body: `{"value": n}` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use verdant_core::{
  challenge::{Challenge, NewChallenge},
  store::RewardLedger,
};

use crate::error::ApiError;

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /challenges`. Title and description are
/// opaque text, supplied ready-made by the caller.
#[derive(Debug, Deserialize)]
pub struct NewChallengeBody {
  pub user_id:       Uuid,
  pub title:         String,
  pub description:   String,
  pub target_value:  i64,
  pub reward_points: i64,
  pub expires_at:    DateTime<Utc>,
}

/// `POST /challenges` — returns 201 + the stored challenge.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewChallengeBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RewardLedger,
{
  let input = NewChallenge::new(
    body.user_id,
    body.title,
    body.description,
    body.target_value,
    body.reward_points,
    body.expires_at,
  )
  .map_err(|e| ApiError::BadRequest(e.to_string()))?;

  let challenge = store
    .create_challenge(input)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(challenge)))
}

// ─── List & get ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub user_id: Uuid,
}

/// `GET /challenges?user_id=<id>`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Challenge>>, ApiError>
where
  S: RewardLedger,
{
  let challenges = store
    .list_challenges(params.user_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(challenges))
}

/// `GET /challenges/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Challenge>, ApiError>
where
  S: RewardLedger,
{
  let challenge = store
    .get_challenge(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("challenge {id} not found")))?;
  Ok(Json(challenge))
}

// ─── Progress ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ProgressBody {
  /// Progress increment; the running total is clamped into
  /// `[0, target_value]`.
  pub value: i64,
}

/// `POST /challenges/:id/progress` — body: `{"value": n}`.
///
/// The first report to reach the target completes the challenge and
/// credits its reward points, exactly once.
pub async fn progress<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<ProgressBody>,
) -> Result<Json<Challenge>, ApiError>
where
  S: RewardLedger,
{
  let challenge = store
    .report_progress(id, body.value)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(challenge))
}
