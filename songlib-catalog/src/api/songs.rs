//! Song CRUD and listing endpoints
//!
//! - `POST   /api/songs`      add (`{"id": n}`)
//! - `GET    /api/songs`      filtered, paginated listing
//! - `GET    /api/songs/:id`  fetch by id
//! - `PUT    /api/songs/:id`  full replace, absent optionals cleared
//! - `PATCH  /api/songs/:id`  partial update, `null` clears a field
//! - `DELETE /api/songs/:id`  delete
//! - `GET    /api/song`       fetch by title and group

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use songlib_common::date_format;
use songlib_common::db::Song;
use tracing::debug;

use crate::models::{FieldChange, FilterCriteria, NewSong, SongPatch};
use crate::services::SongPage;
use crate::{ApiResult, AppState};

/// Body for add and full replace
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongRequest {
    pub title: String,
    pub group: String,
    pub lyrics: Option<String>,
    pub link: Option<String>,
    #[serde(default, with = "date_format::option")]
    pub release_date: Option<NaiveDate>,
}

impl From<SongRequest> for NewSong {
    fn from(req: SongRequest) -> Self {
        NewSong {
            title: req.title,
            group: req.group,
            lyrics: req.lyrics,
            link: req.link,
            release_date: req.release_date,
        }
    }
}

/// Body for partial update: absent keeps, `null` clears
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchRequest {
    #[serde(default)]
    pub title: FieldChange<String>,
    #[serde(default)]
    pub group: FieldChange<String>,
    #[serde(default)]
    pub lyrics: FieldChange<String>,
    #[serde(default)]
    pub link: FieldChange<String>,
    #[serde(default)]
    pub release_date: FieldChange<String>,
}

impl PatchRequest {
    fn into_patch(self) -> songlib_common::Result<SongPatch> {
        Ok(SongPatch {
            title: self.title,
            group: self.group,
            lyrics: self.lyrics,
            link: self.link,
            release_date: self.release_date.try_map(|d| date_format::parse(&d))?,
        })
    }
}

/// Query for the listing endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: i64,
    pub count: Option<i64>,
    pub title: Option<String>,
    pub group: Option<String>,
    pub lyrics: Option<String>,
    pub link: Option<String>,
    pub release_date: Option<String>,
}

impl ListQuery {
    fn criteria(&self) -> songlib_common::Result<FilterCriteria> {
        Ok(FilterCriteria {
            title: self.title.clone(),
            group: self.group.clone(),
            lyrics: self.lyrics.clone(),
            link: self.link.clone(),
            release_date: self
                .release_date
                .as_deref()
                .map(date_format::parse)
                .transpose()?,
        })
    }
}

/// Natural-key query
#[derive(Debug, Deserialize)]
pub struct SongKeyQuery {
    pub title: String,
    pub group: String,
}

#[derive(Debug, Serialize)]
pub struct IdResponse {
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

impl StatusResponse {
    fn success() -> Json<Self> {
        Json(Self { status: "success" })
    }
}

/// POST /api/songs
pub async fn add_song(
    State(state): State<AppState>,
    body: Result<Json<SongRequest>, JsonRejection>,
) -> ApiResult<Json<IdResponse>> {
    let Json(req) = body?;
    let id = state.catalog.add(req.into()).await?;
    Ok(Json(IdResponse { id }))
}

/// GET /api/songs
pub async fn list_songs(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<SongPage>> {
    let Query(query) = query?;
    let criteria = query.criteria()?;
    debug!(page = query.page, count = ?query.count, "List request");

    let page = state
        .catalog
        .get_all(&criteria, query.page, query.count)
        .await?;
    Ok(Json(page))
}

/// GET /api/songs/:id
pub async fn get_song_by_id(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Song>> {
    let Path(id) = id?;
    Ok(Json(state.catalog.get_by_id(id).await?))
}

/// PUT /api/songs/:id
pub async fn replace_song(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<SongRequest>, JsonRejection>,
) -> ApiResult<Json<StatusResponse>> {
    let Path(id) = id?;
    let Json(req) = body?;
    state.catalog.replace(id, req.into()).await?;
    Ok(StatusResponse::success())
}

/// PATCH /api/songs/:id
pub async fn patch_song(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<PatchRequest>, JsonRejection>,
) -> ApiResult<Json<StatusResponse>> {
    let Path(id) = id?;
    let Json(req) = body?;
    state.catalog.update(id, req.into_patch()?).await?;
    Ok(StatusResponse::success())
}

/// DELETE /api/songs/:id
pub async fn delete_song(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<StatusResponse>> {
    let Path(id) = id?;
    state.catalog.delete(id).await?;
    Ok(StatusResponse::success())
}

/// GET /api/song?title=..&group=..
pub async fn get_song(
    State(state): State<AppState>,
    query: Result<Query<SongKeyQuery>, QueryRejection>,
) -> ApiResult<Json<Song>> {
    let Query(key) = query?;
    Ok(Json(state.catalog.get(&key.title, &key.group).await?))
}

/// Build song routes
pub fn song_routes() -> Router<AppState> {
    Router::new()
        .route("/api/songs", get(list_songs).post(add_song))
        .route(
            "/api/songs/:id",
            get(get_song_by_id)
                .put(replace_song)
                .patch(patch_song)
                .delete(delete_song),
        )
        .route("/api/song", get(get_song))
}
