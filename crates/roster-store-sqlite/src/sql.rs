//! Parameterised SQL for the roster store.
//!
//! Reads select one row per contact × address pair through a left join; a
//! childless contact produces a single row with null address columns. The
//! flattener regroups rows by key, so row adjacency is never load-bearing;
//! `contact_id` is still appended as a tiebreak to keep output order
//! deterministic under any caller-chosen sort.

use roster_core::Error;
use roster_core::repository::ListOptions;

/// Column list shared by every read; positions are relied on by
/// [`crate::encode::JoinRow::from_sql_row`].
pub const SELECT_JOINED: &str = "\
SELECT
  c.contact_id, c.birth_date, c.first_name, c.last_name, c.middle_name,
  a.address_id, a.contact_id, a.country, a.title, a.postal_code,
  a.phone, a.province, a.city, a.street1, a.street2, a.email
FROM contact c
LEFT JOIN address a ON a.contact_id = c.contact_id";

/// Sortable columns, qualified to the table that owns them. `contact_id`
/// resolves to the contact side of the join.
const SORT_COLUMNS: &[(&str, &str)] = &[
  ("contact_id", "c.contact_id"),
  ("birth_date", "c.birth_date"),
  ("first_name", "c.first_name"),
  ("last_name", "c.last_name"),
  ("middle_name", "c.middle_name"),
  ("address_id", "a.address_id"),
  ("country", "a.country"),
  ("title", "a.title"),
  ("postal_code", "a.postal_code"),
  ("phone", "a.phone"),
  ("province", "a.province"),
  ("city", "a.city"),
  ("street1", "a.street1"),
  ("street2", "a.street2"),
  ("email", "a.email"),
];

fn resolve_sort_field(field: Option<&str>) -> Result<&'static str, Error> {
  let Some(field) = field else {
    return Ok("c.last_name");
  };
  SORT_COLUMNS
    .iter()
    .find(|(name, _)| field.eq_ignore_ascii_case(name))
    .map(|(_, column)| *column)
    .ok_or_else(|| Error::UnknownSortField(field.to_owned()))
}

/// The `list_all` query: the shared join ordered per `options`.
pub fn list_query(options: &ListOptions) -> Result<String, Error> {
  let column = resolve_sort_field(options.sort_field.as_deref())?;
  let direction = options.direction.unwrap_or_default().as_sql();
  Ok(format!(
    "{SELECT_JOINED}\nORDER BY {column} {direction}, c.contact_id ASC"
  ))
}

/// The `get` query: the shared join restricted to one contact.
pub fn get_query() -> String {
  format!("{SELECT_JOINED}\nWHERE c.contact_id = ?1 ORDER BY a.address_id ASC")
}

// ─── Write statements ────────────────────────────────────────────────────────

pub const INSERT_CONTACT: &str = "\
INSERT INTO contact (birth_date, first_name, last_name, middle_name)
VALUES (?1, ?2, ?3, ?4)";

pub const UPDATE_CONTACT: &str = "\
UPDATE contact
SET birth_date = ?2, first_name = ?3, last_name = ?4, middle_name = ?5
WHERE contact_id = ?1";

pub const SELECT_CONTACT_SCALARS: &str = "\
SELECT birth_date, first_name, last_name, middle_name
FROM contact WHERE contact_id = ?1";

pub const INSERT_ADDRESS: &str = "\
INSERT INTO address (contact_id, country, title, postal_code, phone,
                     province, city, street1, street2, email)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)";

pub const UPDATE_ADDRESS: &str = "\
UPDATE address
SET country = ?3, title = ?4, postal_code = ?5, phone = ?6, province = ?7,
    city = ?8, street1 = ?9, street2 = ?10, email = ?11
WHERE address_id = ?1 AND contact_id = ?2";

pub const SELECT_ADDRESS_OWNED: &str = "\
SELECT country, title, postal_code, phone, province, city, street1, street2, email
FROM address WHERE address_id = ?1 AND contact_id = ?2";

pub const DELETE_ADDRESSES: &str = "DELETE FROM address WHERE contact_id = ?1";

pub const DELETE_CONTACT: &str = "DELETE FROM contact WHERE contact_id = ?1";
