//! Lyrics page endpoint

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::services::LyricsPage;
use crate::{ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct LyricsQuery {
    pub title: String,
    pub group: String,
    pub page: i64,
    /// Verses per page; configured default when absent
    pub verses: Option<i64>,
}

/// GET /api/song/lyrics?title=..&group=..&page=..&verses=..
pub async fn get_lyrics(
    State(state): State<AppState>,
    query: Result<Query<LyricsQuery>, QueryRejection>,
) -> ApiResult<Json<LyricsPage>> {
    let Query(q) = query?;
    let page = state
        .catalog
        .get_text(&q.title, &q.group, q.page, q.verses)
        .await?;
    Ok(Json(page))
}

pub fn lyrics_routes() -> Router<AppState> {
    Router::new().route("/api/song/lyrics", get(get_lyrics))
}
