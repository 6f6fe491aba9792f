//! Handlers for `/submissions` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/submissions` | Body: [`NewSubmissionBody`]; returns 201 + Pending submission |
//! | `GET`  | `/submissions` | `?user_id` required; optional `status` |
//! | `GET`  | `/submissions/:id` | Single submission |
//! | `POST` | `/submissions/:id/approve` | Staff. Returns the computed reward |
//! | `POST` | `/submissions/:id/reject` | Staff. Body: `{"feedback":"..."}` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;
use verdant_core::{
  activity::{ActivityKind, ActivitySubmission, NewSubmission, SubmissionStatus},
  reward::RewardResult,
  store::RewardLedger,
};

use crate::error::ApiError;

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /submissions`.
#[derive(Debug, Deserialize)]
pub struct NewSubmissionBody {
  pub user_id:      Uuid,
  pub kind:         ActivityKind,
  pub quantity:     f64,
  #[serde(default)]
  pub description:  String,
  pub evidence_ref: Option<String>,
}

/// `POST /submissions` — returns 201 + the stored Pending submission.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewSubmissionBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RewardLedger,
{
  let input = NewSubmission::new(
    body.user_id,
    body.kind,
    body.quantity,
    body.description,
    body.evidence_ref,
  )
  .map_err(|e| ApiError::BadRequest(e.to_string()))?;

  let submission = store.submit(input).await.map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(submission)))
}

// ─── List & get ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// Required: the user whose submissions to return.
  pub user_id: Uuid,
  /// If set, restrict to submissions in this state.
  pub status:  Option<SubmissionStatus>,
}

/// `GET /submissions?user_id=<id>[&status=pending]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<ActivitySubmission>>, ApiError>
where
  S: RewardLedger,
{
  let submissions = store
    .list_submissions(params.user_id, params.status)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(submissions))
}

/// `GET /submissions/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<ActivitySubmission>, ApiError>
where
  S: RewardLedger,
{
  let submission = store
    .get_submission(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("submission {id} not found")))?;
  Ok(Json(submission))
}

// ─── Review ───────────────────────────────────────────────────────────────────

/// `POST /submissions/:id/approve` — staff only.
///
/// Returns the computed reward, including any badges first awarded by this
/// approval. A second approve of the same submission is a 409.
pub async fn approve<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<RewardResult>, ApiError>
where
  S: RewardLedger,
{
  let reward = store.approve(id).await.map_err(ApiError::from_store)?;
  Ok(Json(reward))
}

#[derive(Debug, Deserialize)]
pub struct RejectBody {
  pub feedback: String,
}

/// `POST /submissions/:id/reject` — staff only. Body: `{"feedback":"..."}`.
pub async fn reject<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<RejectBody>,
) -> Result<Json<ActivitySubmission>, ApiError>
where
  S: RewardLedger,
{
  let submission = store
    .reject(id, body.feedback)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(submission))
}
