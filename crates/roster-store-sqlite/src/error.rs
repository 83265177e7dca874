//! Error type for `roster-store-sqlite`.

use roster_core::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] roster_core::Error),

  /// A storage-level constraint rejected the write.
  #[error("constraint violation: {0}")]
  Constraint(rusqlite::Error),

  #[error("database error: {0}")]
  Database(tokio_rusqlite::Error),

  #[error("schema bootstrap failed: {0}")]
  Init(tokio_rusqlite::Error),

  #[error("date parse error: {0}")]
  DateParse(String),
}

impl Error {
  /// Coarse classification for caller-facing layers; see
  /// [`roster_core::ErrorKind`].
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::Core(e) => e.kind(),
      Self::Constraint(_) | Self::DateParse(_) => ErrorKind::Conflict,
      Self::Database(_) => ErrorKind::Transient,
      Self::Init(_) => ErrorKind::FatalInit,
    }
  }
}

/// Wrap a domain error for transport out of a [`tokio_rusqlite`] closure;
/// the `From` impl below unwraps it back into [`Error::Core`]. Returning
/// this before `commit` aborts the surrounding transaction.
pub(crate) fn domain(err: roster_core::Error) -> tokio_rusqlite::Error {
  tokio_rusqlite::Error::Other(Box::new(err))
}

impl From<tokio_rusqlite::Error> for Error {
  fn from(err: tokio_rusqlite::Error) -> Self {
    match err {
      tokio_rusqlite::Error::Other(inner) => {
        match inner.downcast::<roster_core::Error>() {
          Ok(core) => Self::Core(*core),
          Err(other) => Self::Database(tokio_rusqlite::Error::Other(other)),
        }
      }
      tokio_rusqlite::Error::Rusqlite(inner) if is_constraint(&inner) => {
        Self::Constraint(inner)
      }
      other => Self::Database(other),
    }
  }
}

fn is_constraint(err: &rusqlite::Error) -> bool {
  matches!(
    err,
    rusqlite::Error::SqliteFailure(code, _)
      if code.code == rusqlite::ErrorCode::ConstraintViolation
  )
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
