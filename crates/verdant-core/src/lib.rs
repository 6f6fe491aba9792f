//! Core types and trait definitions for the Verdant reward ledger.
//!
//! Domain rules live here: reward computation, the level ladder, badge
//! qualification, and challenge progress. The crate carries no HTTP or
//! database dependencies; storage backends and the API layer both build
//! on the [`store::RewardLedger`] trait.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod activity;
pub mod badge;
pub mod challenge;
pub mod error;
pub mod ledger;
pub mod profile;
pub mod reward;
pub mod store;

pub use error::{Error, Result};
