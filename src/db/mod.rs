//! Database module: the submission table and the actor that owns the pool.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `actor.rs`: single owner of the connection pool, driven by RPC messages

pub mod actor;
pub mod models;
pub mod schema;

pub use actor::{DbActorHandle, spawn};
pub use models::{DbSubmission, SubmissionCreate};
pub use schema::SQLITE_INIT;
