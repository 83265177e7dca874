//! Regrouping of flat join rows into nested [`Contact`] aggregates.
//!
//! Grouping is keyed on `contact_id` rather than walking adjacent rows.
//! The caller may order rows by any column, including address-side ones
//! that interleave a contact's rows, and the result is the same set of
//! aggregates with the same address membership. Output preserves the
//! first-seen order of contacts, so the query's ORDER BY still governs
//! the emitted sequence.

use std::collections::HashMap;

use roster_core::contact::Contact;

use crate::{Result, encode::JoinRow};

pub fn flatten(rows: Vec<JoinRow>) -> Result<Vec<Contact>> {
  let mut first_seen: Vec<i64> = Vec::new();
  let mut by_id: HashMap<i64, Contact> = HashMap::new();

  for row in rows {
    let contact_id = row.contact_id;
    if !by_id.contains_key(&contact_id) {
      first_seen.push(contact_id);
      by_id.insert(contact_id, row.to_contact()?);
    }
    if let Some(address) = row.into_address()
      && let Some(contact) = by_id.get_mut(&contact_id)
    {
      contact.addresses.push(address);
    }
  }

  Ok(
    first_seen
      .into_iter()
      .filter_map(|id| by_id.remove(&id))
      .collect(),
  )
}
