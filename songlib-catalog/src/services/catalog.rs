//! Catalog service
//!
//! Thin orchestration over [`SongRepository`]: validates input, consults
//! the optional metadata lookup before any write transaction opens, applies
//! configured page sizes and logs every outcome. Errors keep their kind on
//! the way out so the HTTP layer can map them.

use serde::Serialize;
use songlib_common::config::PagingConfig;
use songlib_common::db::Song;
use songlib_common::{Error, ErrorKind, Result};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::lookup_client::SongInfoProvider;
use crate::db::SongRepository;
use crate::lyrics;
use crate::models::{validate_link, FilterCriteria, NewSong, SongPatch};
use crate::pagination::Window;

/// One page of a song listing
#[derive(Debug, Clone, Serialize)]
pub struct SongPage {
    pub songs: Vec<Song>,
    pub page: i64,
    pub page_size: i64,
}

/// One page of verses
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LyricsPage {
    pub text: String,
    pub page: i64,
    pub verses: i64,
}

pub struct CatalogService {
    repo: SongRepository,
    lookup: Option<Arc<dyn SongInfoProvider>>,
    paging: PagingConfig,
}

impl CatalogService {
    pub fn new(repo: SongRepository, paging: PagingConfig) -> Self {
        Self {
            repo,
            lookup: None,
            paging,
        }
    }

    /// Enable metadata lookup on add
    pub fn with_lookup(mut self, lookup: Arc<dyn SongInfoProvider>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    /// Add a song, filling missing details from the lookup when configured
    pub async fn add(&self, mut song: NewSong) -> Result<i64> {
        const OP: &str = "catalog.add";
        info!(title = %song.title, group = %song.group, "Adding song");

        song.validate().map_err(|e| report(OP, e))?;

        if let Some(lookup) = &self.lookup {
            let missing =
                song.lyrics.is_none() || song.link.is_none() || song.release_date.is_none();
            if missing {
                let detail = lookup
                    .info(&song.title, &song.group)
                    .await
                    .map_err(|e| report(OP, lookup_failure(e)))?;

                if song.link.is_none() {
                    if let Some(link) = &detail.link {
                        validate_link(link).map_err(|e| report(OP, lookup_failure(e)))?;
                    }
                }

                song.lyrics = song.lyrics.or(detail.text);
                song.link = song.link.or(detail.link);
                song.release_date = song.release_date.or(detail.release_date);
                debug!(title = %song.title, group = %song.group, "Applied looked-up details");
            }
        }

        let id = self.repo.add(&song).await.map_err(|e| report(OP, e))?;
        info!(song_id = id, "Song added");
        Ok(id)
    }

    /// Apply a partial update
    pub async fn update(&self, id: i64, patch: SongPatch) -> Result<()> {
        const OP: &str = "catalog.update";
        info!(song_id = id, "Updating song");

        check_id(id).map_err(|e| report(OP, e))?;
        patch.validate().map_err(|e| report(OP, e))?;

        self.repo.update(id, &patch).await.map_err(|e| report(OP, e))?;
        info!(song_id = id, "Song updated");
        Ok(())
    }

    /// Overwrite every field; optionals missing from `song` are cleared
    pub async fn replace(&self, id: i64, song: NewSong) -> Result<()> {
        const OP: &str = "catalog.replace";
        info!(song_id = id, "Replacing song");

        check_id(id).map_err(|e| report(OP, e))?;
        song.validate().map_err(|e| report(OP, e))?;

        self.repo
            .update(id, &SongPatch::replace_with(song))
            .await
            .map_err(|e| report(OP, e))?;
        info!(song_id = id, "Song replaced");
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        const OP: &str = "catalog.delete";
        info!(song_id = id, "Deleting song");

        check_id(id).map_err(|e| report(OP, e))?;
        self.repo.delete(id).await.map_err(|e| report(OP, e))?;
        info!(song_id = id, "Song deleted");
        Ok(())
    }

    /// Fetch by natural key
    pub async fn get(&self, title: &str, group: &str) -> Result<Song> {
        const OP: &str = "catalog.get";
        debug!(title = %title, group = %group, "Fetching song");

        check_key(title, group).map_err(|e| report(OP, e))?;
        self.repo.get(title, group).await.map_err(|e| report(OP, e))
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Song> {
        const OP: &str = "catalog.get_by_id";
        debug!(song_id = id, "Fetching song");

        check_id(id).map_err(|e| report(OP, e))?;
        self.repo.get_by_id(id).await.map_err(|e| report(OP, e))
    }

    /// List songs matching `criteria`
    ///
    /// `count` overrides the configured page size.
    pub async fn get_all(
        &self,
        criteria: &FilterCriteria,
        page: i64,
        count: Option<i64>,
    ) -> Result<SongPage> {
        const OP: &str = "catalog.get_all";
        let size = count.unwrap_or(i64::from(self.paging.page_size));
        debug!(page, size, ?criteria, "Listing songs");

        let window = Window::new(page, size).map_err(|e| report(OP, e))?;
        let songs = self
            .repo
            .get_all(criteria, &window)
            .await
            .map_err(|e| report(OP, e))?;

        info!(page, size, returned = songs.len(), "Listed songs");
        Ok(SongPage {
            songs,
            page: window.page,
            page_size: window.size,
        })
    }

    /// One page of a song's verses
    ///
    /// `verses` overrides the configured verses per page.
    pub async fn get_text(
        &self,
        title: &str,
        group: &str,
        page: i64,
        verses: Option<i64>,
    ) -> Result<LyricsPage> {
        const OP: &str = "catalog.get_text";
        let count = verses.unwrap_or(i64::from(self.paging.verses_per_page));
        debug!(title = %title, group = %group, page, count, "Fetching lyrics page");

        check_key(title, group).map_err(|e| report(OP, e))?;
        // Reject a bad window before touching the store
        Window::new(page, count).map_err(|e| report(OP, e))?;

        let text = self
            .repo
            .get_text(title, group)
            .await
            .map_err(|e| report(OP, e))?;
        let text = lyrics::paginate(&text, page, count).map_err(|e| report(OP, e))?;

        info!(title = %title, group = %group, page, "Fetched lyrics page");
        Ok(LyricsPage {
            text,
            page,
            verses: count,
        })
    }
}

/// Log the failure at a level matching its kind and attach `op`
fn report(op: &str, err: Error) -> Error {
    let err = err.context(op);
    match err.kind() {
        ErrorKind::Internal => error!(error = %err, "Catalog operation failed"),
        ErrorKind::NotFound | ErrorKind::AlreadyExists => {
            warn!(error = %err, "Catalog operation rejected")
        }
        ErrorKind::EmptyArguments | ErrorKind::InvalidArgument => {
            debug!(error = %err, "Catalog request invalid")
        }
    }
    err
}

/// Lookup failures of any kind surface as Internal
fn lookup_failure(err: Error) -> Error {
    match err.kind() {
        ErrorKind::Internal => err,
        _ => Error::Internal(format!("lookup: {}", err)),
    }
}

fn check_id(id: i64) -> Result<()> {
    if id < 1 {
        return Err(Error::InvalidInput(format!("song id must be >= 1, got {}", id)));
    }
    Ok(())
}

fn check_key(title: &str, group: &str) -> Result<()> {
    if title.trim().is_empty() || group.trim().is_empty() {
        return Err(Error::InvalidInput("title and group are required".to_string()));
    }
    Ok(())
}
