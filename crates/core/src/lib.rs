//! `bayu-core`: identifiers and the error taxonomy shared by every crate.
//!
//! This crate has no I/O and no knowledge of HTTP or SQL.

pub mod error;
pub mod id;

pub use error::{ErrorKind, StoreError, StoreResult};
pub use id::{RoleId, SessionLogId, UserId};
