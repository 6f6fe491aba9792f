//! Handlers for `/users` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/users` | Body: [`NewUserBody`]; returns 201 + user |
//! | `GET`  | `/users` | All users |
//! | `GET`  | `/users/:id` | Single user |
//! | `GET`  | `/users/:id/aggregates` | Cached totals + derived level fields |
//! | `GET`  | `/users/:id/badges` | Badges in earn order |
//! | `GET`  | `/users/:id/ledger` | Ledger entries, newest first |
//! | `POST` | `/users/:id/engagement` | Staff. Body: [`EngagementBody`] |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;
use verdant_core::{
  badge::{BadgeKind, UserBadge},
  ledger::LedgerEntry,
  profile::{ProfileView, User},
  store::RewardLedger,
};

use crate::error::ApiError;

// ─── Create & fetch ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct NewUserBody {
  pub display_name: String,
}

/// `POST /users` — returns 201 + the stored user.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewUserBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RewardLedger,
{
  let user = store
    .add_user(body.display_name)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(user)))
}

/// `GET /users`
pub async fn list<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<User>>, ApiError>
where
  S: RewardLedger,
{
  let users = store.list_users().await.map_err(ApiError::from_store)?;
  Ok(Json(users))
}

/// `GET /users/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<User>, ApiError>
where
  S: RewardLedger,
{
  let user = store
    .get_user(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("user {id} not found")))?;
  Ok(Json(user))
}

// ─── Derived views ────────────────────────────────────────────────────────────

/// `GET /users/:id/aggregates`
pub async fn aggregates<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<ProfileView>, ApiError>
where
  S: RewardLedger,
{
  let view = store
    .get_aggregates(id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(view))
}

/// `GET /users/:id/badges`
pub async fn badges<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<UserBadge>>, ApiError>
where
  S: RewardLedger,
{
  let badges = store.list_badges(id).await.map_err(ApiError::from_store)?;
  Ok(Json(badges))
}

/// `GET /users/:id/ledger`
pub async fn ledger<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<LedgerEntry>>, ApiError>
where
  S: RewardLedger,
{
  let entries = store.list_ledger(id).await.map_err(ApiError::from_store)?;
  Ok(Json(entries))
}

// ─── Engagement counters ──────────────────────────────────────────────────────

/// JSON body accepted by `POST /users/:id/engagement`.
#[derive(Debug, Deserialize)]
pub struct EngagementBody {
  pub events_attended: i64,
  #[serde(default)]
  pub has_team:        bool,
}

/// `POST /users/:id/engagement` — staff only. Updates the engagement
/// counters and returns the badges first awarded by this call.
pub async fn engagement<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<EngagementBody>,
) -> Result<Json<Vec<BadgeKind>>, ApiError>
where
  S: RewardLedger,
{
  let new_badges = store
    .record_engagement(id, body.events_attended, body.has_team)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(new_badges))
}
