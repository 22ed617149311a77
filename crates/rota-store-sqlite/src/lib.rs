//! SQLite backend for the Rota chore store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. A single connection serialises
//! writers, which together with the `UNIQUE (schedule_id, due_date)`
//! constraint makes occurrence generation safe to run concurrently.

mod chores;
mod encode;
mod houses;
mod mutate;
mod occurrences;
mod schedules;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
