//! Core data models for the file-storage gateway.
//!
//! These entities describe stored objects and their index records. Object
//! headers map to a database table via `sqlx::FromRow`; index records
//! serialize naturally as JSON via `serde`.

pub mod object;
pub mod record;
