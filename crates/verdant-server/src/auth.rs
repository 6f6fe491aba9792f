//! HTTP Basic-auth verifier and staff middleware.

use std::sync::Arc;

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  extract::{Request, State},
  http::{HeaderMap, HeaderValue, StatusCode, header},
  middleware::Next,
  response::{IntoResponse, Response},
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use thiserror::Error;

/// Credentials accepted as staff for this server instance.
#[derive(Clone)]
pub struct AuthConfig {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
  #[error("unauthorized")]
  Unauthorized,
}

impl IntoResponse for AuthError {
  fn into_response(self) -> Response {
    let mut res = (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    res.headers_mut().insert(
      header::WWW_AUTHENTICATE,
      HeaderValue::from_static("Basic realm=\"verdant\""),
    );
    res
  }
}

/// Verify staff credentials directly from request headers.
pub fn verify_staff(
  headers: &HeaderMap,
  config: &AuthConfig,
) -> Result<(), AuthError> {
  let header_val = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(AuthError::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(AuthError::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| AuthError::Unauthorized)?;
  let creds =
    std::str::from_utf8(&decoded).map_err(|_| AuthError::Unauthorized)?;

  let (username, password) =
    creds.split_once(':').ok_or(AuthError::Unauthorized)?;

  if username != config.username {
    return Err(AuthError::Unauthorized);
  }

  let parsed_hash = PasswordHash::new(&config.password_hash)
    .map_err(|_| AuthError::Unauthorized)?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| AuthError::Unauthorized)?;

  Ok(())
}

/// Middleware guarding the staff routes: every request must carry valid
/// Basic credentials.
pub async fn require_staff(
  State(auth): State<Arc<AuthConfig>>,
  request: Request,
  next: Next,
) -> Response {
  match verify_staff(request.headers(), &auth) {
    Ok(()) => next.run(request).await,
    Err(e) => e.into_response(),
  }
}
