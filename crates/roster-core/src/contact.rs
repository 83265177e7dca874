//! Contact and Address domain types, plus the input and patch shapes
//! accepted by write operations.
//!
//! A contact owns its addresses by composition: an address never outlives
//! its parent, and its `contact_id` is always derived server-side on
//! writes — a payload-supplied owner id is ignored.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ─── Persisted shapes ────────────────────────────────────────────────────────

/// A person record together with every address it owns.
///
/// A contact and its addresses form one consistency boundary: writes land
/// whole or not at all, and reads always return the full nested aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
  /// Storage-generated identity; immutable once assigned.
  pub contact_id:  i64,
  pub birth_date:  Option<NaiveDate>,
  pub first_name:  String,
  pub last_name:   String,
  pub middle_name: Option<String>,
  /// Exactly the address rows whose `contact_id` references this contact.
  pub addresses:   Vec<Address>,
}

/// One address row owned by a [`Contact`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
  /// Storage-generated identity.
  pub address_id:  i64,
  /// Back-pointer to the owning contact, taken from the stored row.
  pub contact_id:  i64,
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

// ─── Write inputs ────────────────────────────────────────────────────────────

/// Input to [`create`](crate::repository::ContactRepository::create).
/// Identity fields are always assigned by the store.
///
/// Deserialisation fills missing fields with their defaults; a missing
/// `first_name` or `last_name` therefore arrives empty and is rejected by
/// the store as a validation error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewContact {
  pub birth_date:  Option<NaiveDate>,
  pub first_name:  String,
  pub last_name:   String,
  pub middle_name: Option<String>,
  pub addresses:   Vec<NewAddress>,
}

/// A not-yet-persisted address inside a [`NewContact`]. The owning
/// `contact_id` is not part of the input; the store derives it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewAddress {
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

// ─── Sparse patches ──────────────────────────────────────────────────────────

/// Sparse patch for [`update`](crate::repository::ContactRepository::update):
/// an absent scalar means "leave unchanged", never "clear". The primary key
/// is never patched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactPatch {
  pub birth_date:  Option<NaiveDate>,
  pub first_name:  Option<String>,
  pub last_name:   Option<String>,
  pub middle_name: Option<String>,
  /// The incoming address list. `None` or `Some` of an empty list deletes
  /// every address owned by the contact; a non-empty list is reconciled
  /// entry by entry and leaves omitted addresses untouched.
  pub addresses:   Option<Vec<AddressPatch>>,
}

/// One incoming address inside a [`ContactPatch`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressPatch {
  /// Absent or `<= 0` marks the entry as not yet persisted (insert). Any
  /// positive value claims an existing row and is validated against the
  /// owning contact before being honoured.
  pub address_id:  Option<i64>,
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

impl From<AddressPatch> for NewAddress {
  /// Treat a patch entry as a fresh insert, discarding any id claim.
  fn from(patch: AddressPatch) -> Self {
    Self {
      country:     patch.country,
      title:       patch.title,
      postal_code: patch.postal_code,
      phone:       patch.phone,
      province:    patch.province,
      city:        patch.city,
      street1:     patch.street1,
      street2:     patch.street2,
      email:       patch.email,
    }
  }
}
