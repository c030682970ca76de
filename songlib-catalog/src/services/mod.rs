//! Catalog services

pub mod catalog;
pub mod lookup_client;

pub use catalog::{CatalogService, LyricsPage, SongPage};
pub use lookup_client::{LookupClient, SongDetail, SongInfoProvider};
