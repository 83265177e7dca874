//! [`SqliteRepository`] — the SQLite implementation of [`ContactRepository`].

use std::path::Path;

use rusqlite::{OptionalExtension as _, Transaction};

use roster_core::{
  contact::{AddressPatch, Contact, ContactPatch, NewAddress, NewContact},
  repository::{ContactRepository, ListOptions},
};

use crate::{
  Error, Result,
  encode::{JoinRow, encode_date},
  error::domain,
  flatten::flatten,
  schema::{RESET, SCHEMA},
  sql,
};

// ─── Repository ──────────────────────────────────────────────────────────────

/// A contact repository backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. The
/// repository holds no contact state of its own; every read goes to the
/// database, and concurrent instances over the same file cannot diverge.
#[derive(Clone)]
pub struct SqliteRepository {
  conn: tokio_rusqlite::Connection,
}

impl SqliteRepository {
  /// Connect to (or create) a database file at `path`. The backing
  /// relations are not touched; run
  /// [`initialize`](ContactRepository::initialize) once at startup.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Ok(Self { conn })
  }

  /// Connect to a fresh in-memory database — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Ok(Self { conn })
  }

  #[cfg(test)]
  pub(crate) async fn address_count(&self, contact_id: i64) -> Result<i64> {
    let count = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM address WHERE contact_id = ?1",
          rusqlite::params![contact_id],
          |row| row.get(0),
        )?)
      })
      .await?;
    Ok(count)
  }
}

// ─── Statement helpers ───────────────────────────────────────────────────────

/// Run the shared join for one contact. Works on a plain connection or,
/// through deref, inside a transaction — writes re-read their own effects
/// with this before committing.
fn select_joined(
  conn: &rusqlite::Connection,
  contact_id: i64,
) -> rusqlite::Result<Vec<JoinRow>> {
  let mut stmt = conn.prepare(&sql::get_query())?;
  stmt
    .query_map(rusqlite::params![contact_id], JoinRow::from_sql_row)?
    .collect()
}

fn insert_address(
  tx: &Transaction<'_>,
  contact_id: i64,
  address: NewAddress,
) -> rusqlite::Result<()> {
  tx.execute(
    sql::INSERT_ADDRESS,
    rusqlite::params![
      contact_id,
      address.country,
      address.title,
      address.postal_code,
      address.phone,
      address.province,
      address.city,
      address.street1,
      address.street2,
      address.email,
    ],
  )?;
  Ok(())
}

/// The current scalar columns of one address row, read before a sparse
/// patch is applied to it.
struct AddressColumns {
  country:     Option<String>,
  title:       Option<String>,
  postal_code: Option<String>,
  phone:       Option<String>,
  province:    Option<String>,
  city:        Option<String>,
  street1:     Option<String>,
  street2:     Option<String>,
  email:       Option<String>,
}

/// Apply one incoming address during an update: insert when it carries no
/// usable id, patch the owned row when it does, and reject an id that is
/// not owned by `contact_id` so the transaction rolls back.
fn reconcile_address(
  tx: &Transaction<'_>,
  contact_id: i64,
  incoming: AddressPatch,
) -> std::result::Result<(), tokio_rusqlite::Error> {
  let Some(address_id) = incoming.address_id.filter(|id| *id > 0) else {
    return Ok(insert_address(tx, contact_id, incoming.into())?);
  };

  let current = tx
    .query_row(
      sql::SELECT_ADDRESS_OWNED,
      rusqlite::params![address_id, contact_id],
      |row| {
        Ok(AddressColumns {
          country:     row.get(0)?,
          title:       row.get(1)?,
          postal_code: row.get(2)?,
          phone:       row.get(3)?,
          province:    row.get(4)?,
          city:        row.get(5)?,
          street1:     row.get(6)?,
          street2:     row.get(7)?,
          email:       row.get(8)?,
        })
      },
    )
    .optional()?;

  // A positive id claiming a row under another contact (or no row at all)
  // is rejected, never silently inserted or overwritten.
  let Some(current) = current else {
    return Err(domain(roster_core::Error::AddressNotOwned {
      address_id,
      contact_id,
    }));
  };

  tx.execute(
    sql::UPDATE_ADDRESS,
    rusqlite::params![
      address_id,
      contact_id,
      incoming.country.or(current.country),
      incoming.title.or(current.title),
      incoming.postal_code.or(current.postal_code),
      incoming.phone.or(current.phone),
      incoming.province.or(current.province),
      incoming.city.or(current.city),
      incoming.street1.or(current.street1),
      incoming.street2.or(current.street2),
      incoming.email.or(current.email),
    ],
  )?;
  Ok(())
}

fn require_name(value: &str, field: &'static str) -> Result<()> {
  if value.trim().is_empty() {
    return Err(roster_core::Error::MissingField(field).into());
  }
  Ok(())
}

/// The single contact produced by flattening the rows of a one-contact
/// join. Empty rows mean the contact does not exist.
fn one_contact(rows: Vec<JoinRow>, contact_id: i64) -> Result<Contact> {
  flatten(rows)?
    .into_iter()
    .next()
    .ok_or(Error::Core(roster_core::Error::ContactNotFound(contact_id)))
}

// ─── ContactRepository impl ──────────────────────────────────────────────────

impl ContactRepository for SqliteRepository {
  type Error = Error;

  async fn initialize(&self, reset_existing: bool) -> Result<()> {
    if reset_existing {
      tracing::info!("dropping existing contact and address relations");
    }
    self
      .conn
      .call(move |conn| {
        if reset_existing {
          conn.execute_batch(RESET)?;
        }
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await
      .map_err(Error::Init)?;
    tracing::debug!("schema ready");
    Ok(())
  }

  async fn list_all(&self, options: ListOptions) -> Result<Vec<Contact>> {
    let query = sql::list_query(&options)?;

    let rows: Vec<JoinRow> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&query)?;
        let rows = stmt
          .query_map([], JoinRow::from_sql_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let contacts = flatten(rows)?;
    if contacts.is_empty() {
      return Err(roster_core::Error::NoContacts.into());
    }
    Ok(contacts)
  }

  async fn get(&self, contact_id: i64) -> Result<Contact> {
    let rows = self
      .conn
      .call(move |conn| Ok(select_joined(conn, contact_id)?))
      .await?;
    one_contact(rows, contact_id)
  }

  async fn create(&self, input: NewContact) -> Result<Contact> {
    require_name(&input.first_name, "first_name")?;
    require_name(&input.last_name, "last_name")?;

    let (contact_id, rows) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        tx.execute(
          sql::INSERT_CONTACT,
          rusqlite::params![
            input.birth_date.map(encode_date),
            input.first_name,
            input.last_name,
            input.middle_name,
          ],
        )?;
        let contact_id = tx.last_insert_rowid();

        // Ownership is forced to the freshly generated id regardless of
        // anything the payload might have claimed.
        for address in input.addresses {
          insert_address(&tx, contact_id, address)?;
        }

        let rows = select_joined(&tx, contact_id)?;
        tx.commit()?;
        Ok((contact_id, rows))
      })
      .await?;

    tracing::debug!(contact_id, "created contact");
    one_contact(rows, contact_id)
  }

  async fn update(&self, contact_id: i64, patch: ContactPatch) -> Result<Contact> {
    let rows = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        // Read-then-merge inside the transaction so a concurrent update
        // cannot slip between the snapshot and the write.
        let current = tx
          .query_row(
            sql::SELECT_CONTACT_SCALARS,
            rusqlite::params![contact_id],
            |row| {
              Ok((
                row.get::<_, Option<String>>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
              ))
            },
          )
          .optional()?;
        let Some((birth_date, first_name, last_name, middle_name)) = current
        else {
          return Err(domain(roster_core::Error::ContactNotFound(contact_id)));
        };

        let birth_date = patch.birth_date.map(encode_date).or(birth_date);
        let first_name = patch.first_name.unwrap_or(first_name);
        let last_name = patch.last_name.unwrap_or(last_name);
        let middle_name = patch.middle_name.or(middle_name);

        if first_name.trim().is_empty() {
          return Err(domain(roster_core::Error::MissingField("first_name")));
        }
        if last_name.trim().is_empty() {
          return Err(domain(roster_core::Error::MissingField("last_name")));
        }

        tx.execute(
          sql::UPDATE_CONTACT,
          rusqlite::params![
            contact_id,
            birth_date,
            first_name,
            last_name,
            middle_name
          ],
        )?;

        match patch.addresses {
          Some(incoming) if !incoming.is_empty() => {
            // Entries are reconciled one by one; stored addresses the
            // payload omits survive untouched.
            for address in incoming {
              reconcile_address(&tx, contact_id, address)?;
            }
          }
          // An absent or empty incoming list empties the address set.
          _ => {
            tx.execute(sql::DELETE_ADDRESSES, rusqlite::params![contact_id])?;
          }
        }

        let rows = select_joined(&tx, contact_id)?;
        tx.commit()?;
        Ok(rows)
      })
      .await?;

    tracing::debug!(contact_id, "updated contact");
    one_contact(rows, contact_id)
  }

  async fn delete(&self, contact_id: i64) -> Result<()> {
    let removed = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(sql::DELETE_ADDRESSES, rusqlite::params![contact_id])?;
        let removed =
          tx.execute(sql::DELETE_CONTACT, rusqlite::params![contact_id])?;
        tx.commit()?;
        Ok(removed)
      })
      .await?;

    if removed == 0 {
      return Err(roster_core::Error::ContactNotFound(contact_id).into());
    }
    tracing::debug!(contact_id, "deleted contact");
    Ok(())
  }
}
