//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use verdant_core::store::StoreError;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Classify a backend failure: domain errors map to client statuses,
  /// infrastructure failures stay 500.
  pub fn from_store<E: StoreError>(e: E) -> Self {
    use verdant_core::Error as Core;
    match e.as_core() {
      Some(
        Core::UserNotFound(_)
        | Core::SubmissionNotFound(_)
        | Core::ChallengeNotFound(_),
      ) => ApiError::NotFound(e.to_string()),
      Some(Core::InvalidStateTransition { .. }) => {
        ApiError::Conflict(e.to_string())
      }
      Some(
        Core::InvalidQuantity(_)
        | Core::InvalidTarget(_)
        | Core::InvalidPoints(_),
      ) => ApiError::BadRequest(e.to_string()),
      None => ApiError::Store(Box::new(e)),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
