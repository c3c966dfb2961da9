//! Database module: the user credential table.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL DDL for initializing the database
//! - `sqlite.rs`: `UsersStorage`, the SQLite-backed credential store

pub mod models;
pub mod schema;
pub mod sqlite;

pub use models::{DbUser, PublicUser};
pub use schema::SQLITE_INIT;
pub use sqlite::{SqlitePool, UserStore, UsersStorage, connect};
