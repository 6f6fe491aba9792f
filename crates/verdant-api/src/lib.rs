//! JSON REST API for Verdant.
//!
//! Exposes axum [`Router`]s backed by any
//! [`verdant_core::store::RewardLedger`]. Auth, TLS, and transport
//! concerns are the caller's responsibility; the router split mirrors the
//! authorisation split — everything in [`staff_router`] changes reward
//! state and should sit behind staff credentials.
//!
//! # Mounting
//!
//! ```rust,ignore
//! Router::new()
//!   .merge(verdant_api::public_router(store.clone()))
//!   .merge(verdant_api::staff_router(store.clone()).layer(auth))
//! ```

pub mod challenges;
pub mod error;
pub mod rewards;
pub mod submissions;
pub mod users;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use verdant_core::store::RewardLedger;

pub use error::ApiError;

/// Routes any authenticated-or-not caller may use: user directory,
/// submission intake, derived views, and challenge progress.
///
/// The returned `Router<()>` can be nested into any parent router
/// regardless of its own state type.
pub fn public_router<S>(store: Arc<S>) -> Router<()>
where
  S: RewardLedger + 'static,
{
  Router::new()
    // Users
    .route("/users", get(users::list::<S>).post(users::create::<S>))
    .route("/users/{id}", get(users::get_one::<S>))
    .route("/users/{id}/aggregates", get(users::aggregates::<S>))
    .route("/users/{id}/badges", get(users::badges::<S>))
    .route("/users/{id}/ledger", get(users::ledger::<S>))
    // Submissions
    .route(
      "/submissions",
      get(submissions::list::<S>).post(submissions::create::<S>),
    )
    .route("/submissions/{id}", get(submissions::get_one::<S>))
    // Challenges
    .route(
      "/challenges",
      get(challenges::list::<S>).post(challenges::create::<S>),
    )
    .route("/challenges/{id}", get(challenges::get_one::<S>))
    .route("/challenges/{id}/progress", post(challenges::progress::<S>))
    .with_state(store)
}

/// Staff-only routes: submission review, engagement counters, and external
/// reward credits. Mount behind an auth layer.
pub fn staff_router<S>(store: Arc<S>) -> Router<()>
where
  S: RewardLedger + 'static,
{
  Router::new()
    .route("/submissions/{id}/approve", post(submissions::approve::<S>))
    .route("/submissions/{id}/reject", post(submissions::reject::<S>))
    .route("/users/{id}/engagement", post(users::engagement::<S>))
    .route("/rewards", post(rewards::create::<S>))
    .with_state(store)
}
