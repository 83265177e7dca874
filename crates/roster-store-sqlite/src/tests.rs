//! Integration tests for `SqliteRepository` against an in-memory database.

use chrono::NaiveDate;
use roster_core::{
  ErrorKind,
  contact::{AddressPatch, ContactPatch, NewAddress, NewContact},
  repository::{ContactRepository, ListOptions, SortDirection},
};

use crate::{Error, SqliteRepository, encode::JoinRow, flatten::flatten, sql};

async fn store() -> SqliteRepository {
  let repo = SqliteRepository::open_in_memory()
    .await
    .expect("in-memory repository");
  repo.initialize(false).await.expect("schema bootstrap");
  repo
}

fn person(first: &str, last: &str) -> NewContact {
  NewContact {
    first_name: first.into(),
    last_name: last.into(),
    ..Default::default()
  }
}

fn address(city: &str) -> NewAddress {
  NewAddress {
    city: Some(city.into()),
    ..Default::default()
  }
}

fn sort_by(field: &str, direction: SortDirection) -> ListOptions {
  ListOptions {
    sort_field: Some(field.into()),
    direction:  Some(direction),
  }
}

// ─── Create / read ───────────────────────────────────────────────────────────

#[tokio::test]
async fn create_then_get_round_trip() {
  let s = store().await;

  let created = s
    .create(NewContact {
      birth_date:  Some(NaiveDate::from_ymd_opt(1990, 4, 2).unwrap()),
      first_name:  "Maria".into(),
      last_name:   "Santos".into(),
      middle_name: Some("Lucia".into()),
      addresses:   vec![
        NewAddress {
          country: Some("BR".into()),
          city: Some("Recife".into()),
          street1: Some("Rua Aurora 12".into()),
          ..Default::default()
        },
        address("Olinda"),
      ],
    })
    .await
    .unwrap();

  assert!(created.contact_id > 0);
  assert_eq!(created.addresses.len(), 2);
  assert!(created.addresses.iter().all(|a| a.address_id > 0));
  assert!(
    created
      .addresses
      .iter()
      .all(|a| a.contact_id == created.contact_id)
  );

  let fetched = s.get(created.contact_id).await.unwrap();
  assert_eq!(fetched, created);
}

#[tokio::test]
async fn create_assigns_ids_from_one() {
  // Fresh store: the first contact and its first address both get id 1.
  let s = store().await;

  let contact = s
    .create(NewContact {
      first_name: "Ana".into(),
      last_name: "Lee".into(),
      addresses: vec![address("Reno")],
      ..Default::default()
    })
    .await
    .unwrap();

  assert_eq!(contact.contact_id, 1);
  assert_eq!(contact.first_name, "Ana");
  assert_eq!(contact.last_name, "Lee");
  assert_eq!(contact.addresses.len(), 1);
  assert_eq!(contact.addresses[0].address_id, 1);
  assert_eq!(contact.addresses[0].contact_id, 1);
  assert_eq!(contact.addresses[0].city.as_deref(), Some("Reno"));
}

#[tokio::test]
async fn create_requires_first_and_last_name() {
  let s = store().await;

  let err = s.create(person("", "Lee")).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(roster_core::Error::MissingField("first_name"))
  ));
  assert_eq!(err.kind(), ErrorKind::Validation);

  let err = s.create(person("Ana", "   ")).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(roster_core::Error::MissingField("last_name"))
  ));
}

// ─── Schema bootstrap ────────────────────────────────────────────────────────

#[tokio::test]
async fn initialize_twice_keeps_data() {
  let s = store().await;
  let contact = s.create(person("Ana", "Lee")).await.unwrap();

  s.initialize(false).await.unwrap();

  let fetched = s.get(contact.contact_id).await.unwrap();
  assert_eq!(fetched, contact);
}

#[tokio::test]
async fn initialize_reset_drops_data() {
  let s = store().await;
  s.create(person("Ana", "Lee")).await.unwrap();

  s.initialize(true).await.unwrap();

  let err = s.list_all(ListOptions::default()).await.unwrap_err();
  assert!(matches!(err, Error::Core(roster_core::Error::NoContacts)));
  assert_eq!(err.kind(), ErrorKind::NotFound);
}

// ─── Lookups ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn get_missing_is_not_found() {
  let s = store().await;
  let err = s.get(42).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(roster_core::Error::ContactNotFound(42))
  ));
  assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn list_all_empty_is_not_found() {
  let s = store().await;
  let err = s.list_all(ListOptions::default()).await.unwrap_err();
  assert!(matches!(err, Error::Core(roster_core::Error::NoContacts)));
}

#[tokio::test]
async fn list_all_defaults_to_last_name_descending() {
  let s = store().await;
  s.create(person("Ann", "Adams")).await.unwrap();
  s.create(person("Cal", "Cruz")).await.unwrap();
  s.create(person("Bea", "Baker")).await.unwrap();

  let contacts = s.list_all(ListOptions::default()).await.unwrap();
  let last_names: Vec<_> =
    contacts.iter().map(|c| c.last_name.as_str()).collect();
  assert_eq!(last_names, ["Cruz", "Baker", "Adams"]);
}

#[tokio::test]
async fn list_all_sorts_by_requested_field() {
  let s = store().await;
  s.create(person("Cal", "Adams")).await.unwrap();
  s.create(person("Ann", "Cruz")).await.unwrap();

  let contacts = s
    .list_all(sort_by("first_name", SortDirection::Asc))
    .await
    .unwrap();
  let first_names: Vec<_> =
    contacts.iter().map(|c| c.first_name.as_str()).collect();
  assert_eq!(first_names, ["Ann", "Cal"]);
}

#[tokio::test]
async fn list_all_rejects_unknown_sort_field() {
  let s = store().await;
  s.create(person("Ana", "Lee")).await.unwrap();

  let err = s
    .list_all(sort_by("no_such_column", SortDirection::Asc))
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Core(roster_core::Error::UnknownSortField(_))
  ));
  assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn list_all_sorted_by_address_column_keeps_grouping() {
  // Sorting by an address column interleaves the rows of a multi-address
  // contact with other contacts' rows; grouping must survive that.
  let s = store().await;

  let multi = s
    .create(NewContact {
      first_name: "Ana".into(),
      last_name: "Lee".into(),
      addresses: vec![address("Anchorage"), address("Zurich")],
      ..Default::default()
    })
    .await
    .unwrap();
  let single = s
    .create(NewContact {
      first_name: "Bo".into(),
      last_name: "Reyes".into(),
      addresses: vec![address("Madrid")],
      ..Default::default()
    })
    .await
    .unwrap();

  let contacts = s
    .list_all(sort_by("city", SortDirection::Asc))
    .await
    .unwrap();

  assert_eq!(contacts.len(), 2);
  // First-seen order under city ASC: Anchorage row first.
  assert_eq!(contacts[0].contact_id, multi.contact_id);
  assert_eq!(contacts[1].contact_id, single.contact_id);

  let mut cities: Vec<_> = contacts[0]
    .addresses
    .iter()
    .filter_map(|a| a.city.as_deref())
    .collect();
  cities.sort_unstable();
  assert_eq!(cities, ["Anchorage", "Zurich"]);
  assert_eq!(contacts[1].addresses.len(), 1);
}

// ─── Update — scalar patching ────────────────────────────────────────────────

#[tokio::test]
async fn update_patches_scalars_sparsely() {
  let s = store().await;
  let created = s
    .create(NewContact {
      birth_date:  Some(NaiveDate::from_ymd_opt(1985, 1, 30).unwrap()),
      first_name:  "Maria".into(),
      last_name:   "Santos".into(),
      middle_name: Some("Lucia".into()),
      ..Default::default()
    })
    .await
    .unwrap();

  let updated = s
    .update(
      created.contact_id,
      ContactPatch {
        first_name: Some("Mara".into()),
        ..Default::default()
      },
    )
    .await
    .unwrap();

  assert_eq!(updated.first_name, "Mara");
  assert_eq!(updated.last_name, "Santos");
  assert_eq!(updated.middle_name.as_deref(), Some("Lucia"));
  assert_eq!(updated.birth_date, created.birth_date);
  assert_eq!(updated.contact_id, created.contact_id);
}

#[tokio::test]
async fn update_rejects_blank_merged_name() {
  let s = store().await;
  let created = s.create(person("Ana", "Lee")).await.unwrap();

  let err = s
    .update(
      created.contact_id,
      ContactPatch {
        first_name: Some("  ".into()),
        ..Default::default()
      },
    )
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Core(roster_core::Error::MissingField("first_name"))
  ));

  // The rejected patch left the row untouched.
  let fetched = s.get(created.contact_id).await.unwrap();
  assert_eq!(fetched.first_name, "Ana");
}

#[tokio::test]
async fn update_missing_contact_is_not_found() {
  let s = store().await;
  let err = s.update(7, ContactPatch::default()).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(roster_core::Error::ContactNotFound(7))
  ));
}

// ─── Update — address reconciliation ─────────────────────────────────────────

#[tokio::test]
async fn update_without_address_list_removes_all_addresses() {
  let s = store().await;
  let created = s
    .create(NewContact {
      first_name: "Ana".into(),
      last_name: "Lee".into(),
      addresses: vec![address("Reno"), address("Bend")],
      ..Default::default()
    })
    .await
    .unwrap();

  let updated = s
    .update(created.contact_id, ContactPatch::default())
    .await
    .unwrap();
  assert!(updated.addresses.is_empty());

  let fetched = s.get(created.contact_id).await.unwrap();
  assert!(fetched.addresses.is_empty());
  assert_eq!(s.address_count(created.contact_id).await.unwrap(), 0);
}

#[tokio::test]
async fn update_with_empty_address_list_removes_all_addresses() {
  let s = store().await;
  let created = s
    .create(NewContact {
      first_name: "Ana".into(),
      last_name: "Lee".into(),
      addresses: vec![address("Reno")],
      ..Default::default()
    })
    .await
    .unwrap();

  let updated = s
    .update(
      created.contact_id,
      ContactPatch {
        addresses: Some(vec![]),
        ..Default::default()
      },
    )
    .await
    .unwrap();
  assert!(updated.addresses.is_empty());
}

#[tokio::test]
async fn update_reconciles_mixed_address_list() {
  let s = store().await;
  let created = s
    .create(NewContact {
      first_name: "Ana".into(),
      last_name: "Lee".into(),
      addresses: vec![
        NewAddress {
          city: Some("Reno".into()),
          country: Some("US".into()),
          ..Default::default()
        },
        address("Bend"),
      ],
      ..Default::default()
    })
    .await
    .unwrap();

  let patched_id = created.addresses[0].address_id;
  let untouched_id = created.addresses[1].address_id;

  let updated = s
    .update(
      created.contact_id,
      ContactPatch {
        addresses: Some(vec![
          AddressPatch {
            address_id: Some(patched_id),
            city: Some("X".into()),
            ..Default::default()
          },
          AddressPatch {
            city: Some("Y".into()),
            ..Default::default()
          },
        ]),
        ..Default::default()
      },
    )
    .await
    .unwrap();

  // Patched survivor, untouched survivor, plus one fresh insert.
  assert_eq!(updated.addresses.len(), 3);

  let patched = updated
    .addresses
    .iter()
    .find(|a| a.address_id == patched_id)
    .unwrap();
  assert_eq!(patched.city.as_deref(), Some("X"));
  // Sparse address patch: the unmentioned column survives.
  assert_eq!(patched.country.as_deref(), Some("US"));

  let untouched = updated
    .addresses
    .iter()
    .find(|a| a.address_id == untouched_id)
    .unwrap();
  assert_eq!(untouched.city.as_deref(), Some("Bend"));

  let inserted = updated
    .addresses
    .iter()
    .find(|a| a.city.as_deref() == Some("Y"))
    .unwrap();
  assert!(inserted.address_id > untouched_id);
  assert_eq!(inserted.contact_id, created.contact_id);
}

#[tokio::test]
async fn update_treats_non_positive_address_id_as_insert() {
  let s = store().await;
  let created = s.create(person("Ana", "Lee")).await.unwrap();

  let updated = s
    .update(
      created.contact_id,
      ContactPatch {
        addresses: Some(vec![
          AddressPatch {
            address_id: Some(0),
            city: Some("Reno".into()),
            ..Default::default()
          },
          AddressPatch {
            address_id: Some(-3),
            city: Some("Bend".into()),
            ..Default::default()
          },
        ]),
        ..Default::default()
      },
    )
    .await
    .unwrap();

  assert_eq!(updated.addresses.len(), 2);
  assert!(updated.addresses.iter().all(|a| a.address_id > 0));
}

#[tokio::test]
async fn update_rejects_foreign_address_id_and_rolls_back() {
  let s = store().await;
  let victim = s
    .create(NewContact {
      first_name: "Ana".into(),
      last_name: "Lee".into(),
      addresses: vec![address("Reno")],
      ..Default::default()
    })
    .await
    .unwrap();
  let attacker = s
    .create(NewContact {
      first_name: "Bo".into(),
      last_name: "Reyes".into(),
      addresses: vec![address("Madrid")],
      ..Default::default()
    })
    .await
    .unwrap();

  let foreign_id = victim.addresses[0].address_id;
  let err = s
    .update(
      attacker.contact_id,
      ContactPatch {
        first_name: Some("Changed".into()),
        addresses: Some(vec![AddressPatch {
          address_id: Some(foreign_id),
          city: Some("Hijacked".into()),
          ..Default::default()
        }]),
        ..Default::default()
      },
    )
    .await
    .unwrap_err();

  assert!(matches!(
    err,
    Error::Core(roster_core::Error::AddressNotOwned { address_id, contact_id })
      if address_id == foreign_id && contact_id == attacker.contact_id
  ));
  assert_eq!(err.kind(), ErrorKind::Validation);

  // The whole transaction rolled back: the scalar patch on the updating
  // contact did not land either, and the other contact is untouched.
  let after_attacker = s.get(attacker.contact_id).await.unwrap();
  assert_eq!(after_attacker, attacker);
  let after_victim = s.get(victim.contact_id).await.unwrap();
  assert_eq!(after_victim, victim);
}

// ─── Delete ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_removes_contact_and_addresses() {
  let s = store().await;
  let created = s
    .create(NewContact {
      first_name: "Ana".into(),
      last_name: "Lee".into(),
      addresses: vec![address("Reno"), address("Bend")],
      ..Default::default()
    })
    .await
    .unwrap();

  s.delete(created.contact_id).await.unwrap();

  let err = s.get(created.contact_id).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(roster_core::Error::ContactNotFound(_))
  ));
  assert_eq!(s.address_count(created.contact_id).await.unwrap(), 0);
}

#[tokio::test]
async fn delete_missing_is_reported_not_found() {
  let s = store().await;
  let err = s.delete(9).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(roster_core::Error::ContactNotFound(9))
  ));
  assert_eq!(err.kind(), ErrorKind::NotFound);
}

// ─── Flattener ───────────────────────────────────────────────────────────────

fn join_row(
  contact_id: i64,
  last_name: &str,
  address: Option<(i64, &str)>,
) -> JoinRow {
  JoinRow {
    contact_id,
    birth_date: None,
    first_name: "Test".into(),
    last_name: last_name.into(),
    middle_name: None,
    address_id: address.map(|(id, _)| id),
    address_contact_id: address.map(|_| contact_id),
    country: None,
    title: None,
    postal_code: None,
    phone: None,
    province: None,
    city: address.map(|(_, city)| city.into()),
    street1: None,
    street2: None,
    email: None,
  }
}

#[test]
fn flatten_groups_interleaved_rows() {
  // Contact 1's rows are split around contact 2's; contact 2 is childless.
  let rows = vec![
    join_row(1, "Lee", Some((10, "Anchorage"))),
    join_row(2, "Reyes", None),
    join_row(1, "Lee", Some((11, "Zurich"))),
  ];

  let contacts = flatten(rows).unwrap();

  assert_eq!(contacts.len(), 2);
  assert_eq!(contacts[0].contact_id, 1);
  assert_eq!(contacts[1].contact_id, 2);

  let ids: Vec<_> = contacts[0].addresses.iter().map(|a| a.address_id).collect();
  assert_eq!(ids, [10, 11]);
  assert!(contacts[0].addresses.iter().all(|a| a.contact_id == 1));
  assert!(contacts[1].addresses.is_empty());
}

#[test]
fn flatten_is_independent_of_row_order() {
  let forwards = vec![
    join_row(1, "Lee", Some((10, "Anchorage"))),
    join_row(1, "Lee", Some((11, "Zurich"))),
    join_row(2, "Reyes", Some((12, "Madrid"))),
  ];
  let interleaved = vec![
    join_row(2, "Reyes", Some((12, "Madrid"))),
    join_row(1, "Lee", Some((11, "Zurich"))),
    join_row(1, "Lee", Some((10, "Anchorage"))),
  ];

  let mut a = flatten(forwards).unwrap();
  let mut b = flatten(interleaved).unwrap();
  for contacts in [&mut a, &mut b] {
    contacts.sort_by_key(|c| c.contact_id);
    for contact in contacts.iter_mut() {
      contact.addresses.sort_by_key(|a| a.address_id);
    }
  }

  assert_eq!(a, b);
}

// ─── Query builder ───────────────────────────────────────────────────────────

#[test]
fn list_query_defaults_and_tiebreak() {
  let query = sql::list_query(&ListOptions::default()).unwrap();
  assert!(query.ends_with("ORDER BY c.last_name DESC, c.contact_id ASC"));
}

#[test]
fn list_query_resolves_address_columns() {
  let query =
    sql::list_query(&sort_by("city", SortDirection::Asc)).unwrap();
  assert!(query.ends_with("ORDER BY a.city ASC, c.contact_id ASC"));
}

#[test]
fn list_query_rejects_unknown_column() {
  let err = sql::list_query(&sort_by("drop table", SortDirection::Asc))
    .unwrap_err();
  assert!(matches!(err, roster_core::Error::UnknownSortField(_)));
}

#[test]
fn sort_direction_parses_case_insensitively() {
  assert_eq!("asc".parse::<SortDirection>().unwrap(), SortDirection::Asc);
  assert_eq!("DESC".parse::<SortDirection>().unwrap(), SortDirection::Desc);
  assert!("sideways".parse::<SortDirection>().is_err());
}
