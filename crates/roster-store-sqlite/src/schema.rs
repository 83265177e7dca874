//! SQL schema for the roster SQLite store.
//!
//! Executed by `initialize`; not on any request path. The upstream varchar
//! bounds are kept as column comments — SQLite stores them all as TEXT and
//! does not enforce lengths.

/// Backing relations; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS contact (
    contact_id  INTEGER PRIMARY KEY,
    birth_date  TEXT,               -- ISO 8601 calendar date
    first_name  TEXT NOT NULL,      -- varchar(50)
    last_name   TEXT NOT NULL,      -- varchar(50)
    middle_name TEXT                -- varchar(50)
);

CREATE TABLE IF NOT EXISTS address (
    address_id  INTEGER PRIMARY KEY,
    contact_id  INTEGER NOT NULL REFERENCES contact(contact_id),
    country     TEXT,               -- varchar(6)
    title       TEXT,               -- varchar(5)
    postal_code TEXT,               -- varchar(15)
    phone       TEXT,               -- varchar(15)
    province    TEXT,               -- varchar(20)
    city        TEXT,               -- varchar(50)
    street1     TEXT,               -- varchar(100)
    street2     TEXT,               -- varchar(100)
    email       TEXT                -- varchar(250)
);

CREATE INDEX IF NOT EXISTS address_contact_idx ON address(contact_id);
";

/// Destructive reset; the child relation is dropped before the parent.
pub const RESET: &str = "
DROP TABLE IF EXISTS address;
DROP TABLE IF EXISTS contact;
";
