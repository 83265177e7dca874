//! Codecs between domain values and their SQLite column representations,
//! plus the raw row type read back from the contact/address join.
//!
//! Dates are stored as ISO 8601 calendar-date strings (`YYYY-MM-DD`).

use chrono::NaiveDate;
use roster_core::contact::{Address, Contact};

use crate::{Error, Result};

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String {
  d.format("%Y-%m-%d").to_string()
}

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// One raw row of the contact/address left join. The address columns are
/// all null for a childless contact.
#[derive(Debug)]
pub struct JoinRow {
  // contact columns
  pub contact_id:  i64,
  pub birth_date:  Option<String>,
  pub first_name:  String,
  pub last_name:   String,
  pub middle_name: Option<String>,
  // address columns
  pub address_id:         Option<i64>,
  pub address_contact_id: Option<i64>,
  pub country:     Option<String>,
  pub title:       Option<String>,
  pub postal_code: Option<String>,
  pub phone:       Option<String>,
  pub province:    Option<String>,
  pub city:        Option<String>,
  pub street1:     Option<String>,
  pub street2:     Option<String>,
  pub email:       Option<String>,
}

impl JoinRow {
  /// Column order must match [`crate::sql::SELECT_JOINED`].
  pub fn from_sql_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      contact_id:         row.get(0)?,
      birth_date:         row.get(1)?,
      first_name:         row.get(2)?,
      last_name:          row.get(3)?,
      middle_name:        row.get(4)?,
      address_id:         row.get(5)?,
      address_contact_id: row.get(6)?,
      country:            row.get(7)?,
      title:              row.get(8)?,
      postal_code:        row.get(9)?,
      phone:              row.get(10)?,
      province:           row.get(11)?,
      city:               row.get(12)?,
      street1:            row.get(13)?,
      street2:            row.get(14)?,
      email:              row.get(15)?,
    })
  }

  /// The contact half of the row, with no addresses attached yet.
  pub fn to_contact(&self) -> Result<Contact> {
    let birth_date =
      self.birth_date.as_deref().map(decode_date).transpose()?;
    Ok(Contact {
      contact_id:  self.contact_id,
      birth_date,
      first_name:  self.first_name.clone(),
      last_name:   self.last_name.clone(),
      middle_name: self.middle_name.clone(),
      addresses:   Vec::new(),
    })
  }

  /// The address half of the row, if the address side of the join is
  /// non-null. The owning id is taken from the address side of the join.
  pub fn into_address(self) -> Option<Address> {
    let address_id = self.address_id?;
    Some(Address {
      address_id,
      contact_id:  self.address_contact_id.unwrap_or(self.contact_id),
      country:     self.country,
      title:       self.title,
      postal_code: self.postal_code,
      phone:       self.phone,
      province:    self.province,
      city:        self.city,
      street1:     self.street1,
      street2:     self.street2,
      email:       self.email,
    })
  }
}
