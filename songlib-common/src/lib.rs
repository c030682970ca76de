//! # songlib Common Library
//!
//! Shared code for the songlib catalog service:
//! - Error taxonomy (`Error`, `ErrorKind`)
//! - Configuration loading
//! - Database bootstrap and row models
//! - Wire date format helpers

pub mod config;
pub mod date_format;
pub mod db;
pub mod error;

pub use error::{Error, ErrorKind, Result};
