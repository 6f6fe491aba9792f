//! Handler for `/rewards` — staff-issued external reward credits.
//!
//! Event attendance and similar non-submission rewards enter the ledger
//! here, with no submission back-reference.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use uuid::Uuid;
use verdant_core::store::RewardLedger;

use crate::error::ApiError;

/// JSON body accepted by `POST /rewards`.
#[derive(Debug, Deserialize)]
pub struct ExternalRewardBody {
  pub user_id:         Uuid,
  pub points:          i64,
  #[serde(default)]
  pub carbon_saved_kg: f64,
  pub note:            Option<String>,
}

/// `POST /rewards` — staff only. Returns 201 + the appended ledger entry.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<ExternalRewardBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RewardLedger,
{
  let entry = store
    .record_external_reward(body.user_id, body.points, body.carbon_saved_kg, body.note)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(entry)))
}
