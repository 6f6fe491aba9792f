//! HTTP server assembly for Verdant.
//!
//! Composes the public and staff routers from `verdant-api` over any
//! [`RewardLedger`], guards the staff routes with Basic auth, and wraps
//! the whole app in request tracing.

pub mod auth;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, middleware};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use verdant_core::store::RewardLedger;

use auth::{AuthConfig, require_staff};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:                String,
  pub port:                u16,
  pub store_path:          PathBuf,
  pub staff_username:      String,
  pub staff_password_hash: String,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router: public routes open, staff routes
/// behind [`require_staff`], everything traced.
pub fn router<S>(store: Arc<S>, auth: Arc<AuthConfig>) -> Router
where
  S: RewardLedger + 'static,
{
  let staff = verdant_api::staff_router(store.clone())
    .layer(middleware::from_fn_with_state(auth, require_staff));

  Router::new()
    .merge(verdant_api::public_router(store))
    .merge(staff)
    .layer(TraceLayer::new_for_http())
}
