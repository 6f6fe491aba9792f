//! SQLite backend for the Verdant reward ledger.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. Every reward-affecting
//! operation executes as a single SQLite transaction, so a failure
//! anywhere in the approve/credit pipeline rolls the whole step back.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteLedger;

#[cfg(test)]
mod tests;
