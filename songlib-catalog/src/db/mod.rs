//! Database access for the catalog
//!
//! Schema creation lives in `songlib_common::db`; this module owns the
//! song queries.

pub mod guard;
pub mod query;
pub mod songs;

pub use songs::SongRepository;
