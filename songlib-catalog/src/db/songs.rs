//! Song repository
//!
//! Every write runs in one transaction: a failure at any step drops the
//! transaction uncommitted, which rolls it back. Writes also pass through
//! an in-process gate so the duplicate check and the insert it protects
//! cannot interleave with another request's write.

use songlib_common::db::{Group, Song};
use songlib_common::{Error, Result};
use sqlx::query::{Query, QueryAs};
use sqlx::sqlite::SqliteArguments;
use sqlx::{Sqlite, SqliteConnection, SqlitePool};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::guard::natural_key_taken;
use super::query::{build_list_query, build_update_query, QueryArg, SONG_COLUMNS};
use crate::models::{FieldChange, FilterCriteria, NewSong, SongPatch};
use crate::pagination::Window;

/// Persistence for songs and their group links
pub struct SongRepository {
    pool: SqlitePool,
    write_gate: Mutex<()>,
}

impl SongRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            write_gate: Mutex::new(()),
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Insert a song under `song.group`, creating the group if needed
    ///
    /// Fails with `AlreadyExists` (and writes nothing) when the natural key
    /// is taken. Returns the new song id.
    pub async fn add(&self, song: &NewSong) -> Result<i64> {
        let _gate = self.write_gate.lock().await;
        self.add_in_tx(song).await.map_err(|e| e.context("songs.add"))
    }

    async fn add_in_tx(&self, song: &NewSong) -> Result<i64> {
        let mut tx = self.pool.begin().await?;

        let group = upsert_group(&mut tx, &song.group).await?;

        if natural_key_taken(&mut tx, &song.title, &song.group, None).await? {
            return Err(Error::AlreadyExists(format!(
                "song '{}' by '{}'",
                song.title, song.group
            )));
        }

        let song_id = sqlx::query(
            "INSERT INTO songs (title, lyrics, link, release_date) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&song.title)
        .bind(&song.lyrics)
        .bind(&song.link)
        .bind(song.release_date)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        link_song(&mut tx, song_id, group.id).await?;

        tx.commit().await?;

        info!(song_id, group_id = group.id, title = %song.title, group = %group.name, "Added song");
        Ok(song_id)
    }

    /// Delete a song and its link rows; groups are kept
    pub async fn delete(&self, id: i64) -> Result<()> {
        let _gate = self.write_gate.lock().await;
        self.delete_in_tx(id).await.map_err(|e| e.context("songs.delete"))
    }

    async fn delete_in_tx(&self, id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM song_groups WHERE song_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM songs WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(Error::NotFound(format!("song {}", id)));
        }

        tx.commit().await?;

        info!(song_id = id, "Deleted song");
        Ok(())
    }

    /// Apply a partial update
    ///
    /// Group changes repoint the link row inside the same transaction as
    /// the column update. A title or group change is checked against the
    /// natural key of every other song.
    pub async fn update(&self, id: i64, patch: &SongPatch) -> Result<()> {
        if patch.is_empty() {
            return Err(Error::EmptyArguments(format!("song {}: nothing to update", id))
                .context("songs.update"));
        }

        let _gate = self.write_gate.lock().await;
        self.update_in_tx(id, patch)
            .await
            .map_err(|e| e.context("songs.update"))
    }

    async fn update_in_tx(&self, id: i64, patch: &SongPatch) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let current: Option<(String, Option<String>)> = sqlx::query_as(
            r#"
            SELECT s.title, g.name
            FROM songs s
            LEFT JOIN song_groups sg ON sg.song_id = s.id
            LEFT JOIN groups g ON g.id = sg.group_id
            WHERE s.id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let (current_title, current_group) =
            current.ok_or_else(|| Error::NotFound(format!("song {}", id)))?;

        if let FieldChange::Set(group) = &patch.group {
            let target = upsert_group(&mut tx, group).await?;
            sqlx::query("DELETE FROM song_groups WHERE song_id = ?1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            link_song(&mut tx, id, target.id).await?;
            debug!(song_id = id, group_id = target.id, group = %target.name, "Repointed song group");
        }

        let title = patch.title.as_set().unwrap_or(&current_title);
        let group = patch.group.as_set().or(current_group.as_ref());
        let title_changed = *title != current_title;
        let group_changed = group != current_group.as_ref();

        if title_changed || group_changed {
            if let Some(group) = group {
                if natural_key_taken(&mut tx, title, group, Some(id)).await? {
                    return Err(Error::AlreadyExists(format!(
                        "song '{}' by '{}'",
                        title, group
                    )));
                }
            }
        }

        if let Some(update) = build_update_query(id, patch) {
            let updated = bind_args(sqlx::query::<Sqlite>(&update.sql), &update.args)
                .execute(&mut *tx)
                .await?
                .rows_affected();

            if updated == 0 {
                return Err(Error::NotFound(format!("song {}", id)));
            }
        }

        tx.commit().await?;

        info!(song_id = id, "Updated song");
        Ok(())
    }

    /// Fetch one song by surrogate id
    pub async fn get_by_id(&self, id: i64) -> Result<Song> {
        let sql = format!(
            "SELECT {} FROM songs s \
             LEFT JOIN song_groups sg ON sg.song_id = s.id \
             LEFT JOIN groups g ON g.id = sg.group_id \
             WHERE s.id = ?1",
            SONG_COLUMNS
        );

        sqlx::query_as::<_, Song>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::from)
            .and_then(|row| row.ok_or_else(|| Error::NotFound(format!("song {}", id))))
            .map_err(|e| e.context("songs.get_by_id"))
    }

    /// Fetch one song by natural key
    pub async fn get(&self, title: &str, group: &str) -> Result<Song> {
        let sql = format!(
            "SELECT {} FROM songs s \
             JOIN song_groups sg ON sg.song_id = s.id \
             JOIN groups g ON g.id = sg.group_id \
             WHERE s.title = ?1 AND g.name = ?2",
            SONG_COLUMNS
        );

        sqlx::query_as::<_, Song>(&sql)
            .bind(title)
            .bind(group)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::from)
            .and_then(|row| {
                row.ok_or_else(|| Error::NotFound(format!("song '{}' by '{}'", title, group)))
            })
            .map_err(|e| e.context("songs.get"))
    }

    /// One page of songs matching `criteria`, ordered by id
    ///
    /// An empty page is an empty list, not an error.
    pub async fn get_all(&self, criteria: &FilterCriteria, window: &Window) -> Result<Vec<Song>> {
        let query = build_list_query(criteria, window);
        debug!(sql = %query.sql, args = query.args.len(), "Listing songs");

        bind_args(sqlx::query_as::<Sqlite, Song>(&query.sql), &query.args)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::from(e).context("songs.get_all"))
    }

    /// Raw lyrics of one song
    ///
    /// `NotFound` when the song is missing or has no lyrics stored.
    pub async fn get_text(&self, title: &str, group: &str) -> Result<String> {
        let row: Option<Option<String>> = sqlx::query_scalar(
            r#"
            SELECT s.lyrics
            FROM songs s
            JOIN song_groups sg ON sg.song_id = s.id
            JOIN groups g ON g.id = sg.group_id
            WHERE s.title = ?1 AND g.name = ?2
            "#,
        )
        .bind(title)
        .bind(group)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::from(e).context("songs.get_text"))?;

        match row {
            Some(Some(lyrics)) => Ok(lyrics),
            Some(None) => Err(Error::NotFound(format!(
                "song '{}' by '{}' has no lyrics",
                title, group
            ))
            .context("songs.get_text")),
            None => Err(Error::NotFound(format!("song '{}' by '{}'", title, group))
                .context("songs.get_text")),
        }
    }
}

/// Insert the group if absent and return the stored row
async fn upsert_group(conn: &mut SqliteConnection, name: &str) -> Result<Group> {
    sqlx::query("INSERT INTO groups (name) VALUES (?1) ON CONFLICT(name) DO NOTHING")
        .bind(name)
        .execute(&mut *conn)
        .await?;

    let group: Group = sqlx::query_as("SELECT id, name FROM groups WHERE name = ?1")
        .bind(name)
        .fetch_one(&mut *conn)
        .await?;

    Ok(group)
}

async fn link_song(conn: &mut SqliteConnection, song_id: i64, group_id: i64) -> Result<()> {
    sqlx::query("INSERT INTO song_groups (song_id, group_id) VALUES (?1, ?2)")
        .bind(song_id)
        .bind(group_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Bind built arguments onto a query, in placeholder order
trait BindArgs<'q>: Sized {
    fn bind_arg(self, arg: &'q QueryArg) -> Self;
}

impl<'q> BindArgs<'q> for Query<'q, Sqlite, SqliteArguments<'q>> {
    fn bind_arg(self, arg: &'q QueryArg) -> Self {
        match arg {
            QueryArg::Text(v) => self.bind(v.as_str()),
            QueryArg::Date(v) => self.bind(*v),
            QueryArg::Int(v) => self.bind(*v),
            QueryArg::Null => self.bind(Option::<String>::None),
        }
    }
}

impl<'q> BindArgs<'q> for QueryAs<'q, Sqlite, Song, SqliteArguments<'q>> {
    fn bind_arg(self, arg: &'q QueryArg) -> Self {
        match arg {
            QueryArg::Text(v) => self.bind(v.as_str()),
            QueryArg::Date(v) => self.bind(*v),
            QueryArg::Int(v) => self.bind(*v),
            QueryArg::Null => self.bind(Option::<String>::None),
        }
    }
}

fn bind_args<'q, Q: BindArgs<'q>>(query: Q, args: &'q [QueryArg]) -> Q {
    args.iter().fold(query, |q, arg| q.bind_arg(arg))
}
