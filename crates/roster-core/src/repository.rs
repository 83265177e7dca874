//! The `ContactRepository` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `roster-store-sqlite`).
//! Callers depend on this abstraction, not on any concrete backend.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::contact::{Contact, ContactPatch, NewContact};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Sort direction for [`ContactRepository::list_all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
  Asc,
  #[default]
  Desc,
}

impl SortDirection {
  pub fn as_sql(self) -> &'static str {
    match self {
      Self::Asc => "ASC",
      Self::Desc => "DESC",
    }
  }
}

impl std::str::FromStr for SortDirection {
  type Err = crate::Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    if s.eq_ignore_ascii_case("asc") {
      Ok(Self::Asc)
    } else if s.eq_ignore_ascii_case("desc") {
      Ok(Self::Desc)
    } else {
      Err(crate::Error::UnknownSortDirection(s.to_owned()))
    }
  }
}

/// Parameters for [`ContactRepository::list_all`].
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
  /// Column to order by; must exist on the contact or the address table.
  /// Defaults to the contact's `last_name`.
  pub sort_field: Option<String>,
  /// Defaults to [`SortDirection::Desc`].
  pub direction:  Option<SortDirection>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the contact aggregate store.
///
/// Every multi-statement write executes under one transaction: an operation
/// either lands whole or rolls back entirely, and a partially written
/// aggregate is never visible to other transactions. Implementations hold
/// no contact state between calls — every read goes to storage.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait ContactRepository: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Create the backing relations if absent. With `reset_existing`, drop
  /// them first (children before parent), losing all data.
  ///
  /// Idempotent; meant to run once at process start, never on a request
  /// path. Failure here is fatal at startup.
  fn initialize(
    &self,
    reset_existing: bool,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Every contact with its full address set, ordered per `options`.
  /// An empty store surfaces as a not-found error.
  fn list_all(
    &self,
    options: ListOptions,
  ) -> impl Future<Output = Result<Vec<Contact>, Self::Error>> + Send + '_;

  /// One contact with its full address set.
  fn get(
    &self,
    contact_id: i64,
  ) -> impl Future<Output = Result<Contact, Self::Error>> + Send + '_;

  /// Insert a contact and all its addresses atomically; returns the stored
  /// aggregate with generated ids.
  fn create(
    &self,
    input: NewContact,
  ) -> impl Future<Output = Result<Contact, Self::Error>> + Send + '_;

  /// Apply a sparse patch to a contact's scalars and reconcile its address
  /// set, atomically; returns the stored aggregate after the write.
  fn update(
    &self,
    contact_id: i64,
    patch: ContactPatch,
  ) -> impl Future<Output = Result<Contact, Self::Error>> + Send + '_;

  /// Remove a contact and every address it owns. A missing target is
  /// reported as not-found; storage state is the same either way.
  fn delete(
    &self,
    contact_id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
