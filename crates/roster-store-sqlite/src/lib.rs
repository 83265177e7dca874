//! SQLite backend for the roster contact repository.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. Every multi-statement write
//! runs inside a single transaction; a failed step rolls the whole
//! operation back.

mod encode;
mod flatten;
mod schema;
mod sql;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteRepository;

#[cfg(test)]
mod tests;
