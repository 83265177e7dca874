//! Core types and trait definitions for the roster contact repository.
//!
//! This crate is deliberately free of database dependencies. The storage
//! backend (`roster-store-sqlite`) and any caller-facing layer depend on
//! this abstraction; it depends on nothing heavier than serde and chrono.

pub mod contact;
pub mod error;
pub mod repository;

pub use error::{Error, ErrorKind, Result};
