//! External song metadata lookup
//!
//! Fetches lyrics, link and release date for a (group, song) pair from an
//! HTTP service exposing `GET {base_url}/info?group=..&song=..`.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use songlib_common::{date_format, Error, Result};
use std::time::Duration;

const USER_AGENT: &str = concat!("songlib/", env!("CARGO_PKG_VERSION"));

/// Metadata returned by a lookup; every field may be missing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SongDetail {
    pub text: Option<String>,
    pub link: Option<String>,
    pub release_date: Option<NaiveDate>,
}

/// Source of song metadata consulted when a song is added
#[async_trait]
pub trait SongInfoProvider: Send + Sync {
    async fn info(&self, title: &str, group: &str) -> Result<SongDetail>;
}

/// Wire shape of the lookup response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InfoResponse {
    text: Option<String>,
    link: Option<String>,
    release_date: Option<String>,
}

/// HTTP lookup client
pub struct LookupClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl LookupClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Internal(format!("failed to build lookup client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl SongInfoProvider for LookupClient {
    async fn info(&self, title: &str, group: &str) -> Result<SongDetail> {
        let url = format!("{}/info", self.base_url);

        tracing::debug!(url = %url, title = %title, group = %group, "Querying lookup service");

        let response = self
            .http_client
            .get(&url)
            .query(&[("group", group), ("song", title)])
            .send()
            .await
            .map_err(|e| Error::Internal(format!("lookup request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Internal(format!(
                "lookup returned status {}",
                status.as_u16()
            )));
        }

        let body: InfoResponse = response
            .json()
            .await
            .map_err(|e| Error::Internal(format!("lookup response unreadable: {}", e)))?;

        let release_date = body
            .release_date
            .as_deref()
            .map(date_format::parse)
            .transpose()
            .map_err(|e| Error::Internal(format!("lookup release date: {}", e)))?;

        tracing::info!(title = %title, group = %group, "Received song details from lookup");

        Ok(SongDetail {
            text: body.text,
            link: body.link,
            release_date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Query, http::StatusCode, routing::get, Json, Router};
    use serde_json::{json, Value};
    use songlib_common::ErrorKind;
    use std::collections::HashMap;

    /// Serve `router` on an ephemeral port and return its base URL
    async fn spawn_stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client(base: &str) -> LookupClient {
        LookupClient::new(base, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_info_success() {
        let router = Router::new().route(
            "/info",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                assert_eq!(params.get("group").map(String::as_str), Some("Muse"));
                assert_eq!(params.get("song").map(String::as_str), Some("Supermassive Black Hole"));
                Json(json!({
                    "releaseDate": "16.07.2006",
                    "text": "Ooh baby, don't you know I suffer?\n\nOoh baby, can you hear me moan?",
                    "link": "https://www.youtube.com/watch?v=Xsp3_a-PMTw"
                }))
            }),
        );
        let base = spawn_stub(router).await;

        let detail = client(&base)
            .info("Supermassive Black Hole", "Muse")
            .await
            .unwrap();

        assert_eq!(detail.release_date, NaiveDate::from_ymd_opt(2006, 7, 16));
        assert!(detail.text.unwrap().contains("\n\n"));
        assert_eq!(
            detail.link.as_deref(),
            Some("https://www.youtube.com/watch?v=Xsp3_a-PMTw")
        );
    }

    #[tokio::test]
    async fn test_non_success_status_is_internal() {
        let router = Router::new().route("/info", get(|| async { StatusCode::BAD_GATEWAY }));
        let base = spawn_stub(router).await;

        let err = client(&base).info("Uprising", "Muse").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[tokio::test]
    async fn test_bad_date_is_internal() {
        let router = Router::new().route(
            "/info",
            get(|| async { Json(json!({ "releaseDate": "2006-07-16" })) }),
        );
        let base = spawn_stub(router).await;

        let err = client(&base).info("Uprising", "Muse").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[tokio::test]
    async fn test_missing_fields_are_none() {
        let router = Router::new().route("/info", get(|| async { Json(Value::Object(Default::default())) }));
        let base = spawn_stub(router).await;

        let detail = client(&format!("{}/", base)).info("Uprising", "Muse").await.unwrap();
        assert_eq!(detail, SongDetail::default());
    }

    #[tokio::test]
    async fn test_unreachable_is_internal() {
        // Bind then drop to get a port with nothing listening
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client(&format!("http://{}", addr))
            .info("Uprising", "Muse")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }
}
