//! Error types for `roster-core`.

use thiserror::Error;

/// Coarse classification exposed to caller-facing layers so they can map
/// failures (e.g. to HTTP statuses) without matching on variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// The lookup or delete target is absent.
  NotFound,
  /// The payload is semantically unacceptable.
  Validation,
  /// A storage-level constraint rejected the operation.
  Conflict,
  /// Connection-level failure; retrying is at the caller's discretion.
  Transient,
  /// Schema bootstrap failed; fatal at startup.
  FatalInit,
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("contact not found: {0}")]
  ContactNotFound(i64),

  #[error("no contacts in store")]
  NoContacts,

  #[error("required field missing: {0}")]
  MissingField(&'static str),

  #[error("address {address_id} does not belong to contact {contact_id}")]
  AddressNotOwned { address_id: i64, contact_id: i64 },

  #[error("unknown sort field: {0:?}")]
  UnknownSortField(String),

  #[error("unknown sort direction: {0:?}")]
  UnknownSortDirection(String),
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::ContactNotFound(_) | Self::NoContacts => ErrorKind::NotFound,
      Self::MissingField(_)
      | Self::AddressNotOwned { .. }
      | Self::UnknownSortField(_)
      | Self::UnknownSortDirection(_) => ErrorKind::Validation,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
