use music_logging::music_warn;
use serde::Deserialize;
use url::Url;

use super::{AdapterError, SongAdapter};
use crate::extract::{extract_play_id, find_marked_anchor, DOWNLOAD_MARKER};
use crate::http::HttpClient;
use crate::AdapterResult;

const SUCCESS_CODE: i64 = 1;

#[derive(Debug, Deserialize)]
struct PlayUrlReply {
    code: i64,
    #[serde(default)]
    data: Option<PlayUrlData>,
}

#[derive(Debug, Deserialize)]
struct PlayUrlData {
    #[serde(default)]
    url: Option<String>,
}

/// Three hops: search page -> detail page -> play-url endpoint.
pub struct DetailPageAdapter {
    client: HttpClient,
    base: Url,
}

impl DetailPageAdapter {
    pub fn new(client: HttpClient, base_url: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            client,
            base: Url::parse(base_url)?,
        })
    }

    fn search_url(&self, song_name: &str) -> Result<Url, AdapterError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| AdapterError::Malformed(format!("{} cannot be a base", self.base)))?
            .pop_if_empty()
            .push("s")
            .push(song_name);
        Ok(url)
    }

    async fn detail_href(&self, song_name: &str) -> Result<Url, AdapterError> {
        let page = self.client.get_text(self.search_url(song_name)?.as_str()).await?;
        let href = find_marked_anchor(&page, DOWNLOAD_MARKER)
            .ok_or(AdapterError::PatternMissing("detail link"))?;
        Ok(self.base.join(&href)?)
    }

    async fn play_id(&self, detail: &Url) -> Result<String, AdapterError> {
        let page = self.client.get_text(detail.as_str()).await?;
        extract_play_id(&page).ok_or(AdapterError::PatternMissing("window.play_id"))
    }

    async fn play_url(&self, play_id: &str) -> Result<String, AdapterError> {
        let endpoint = self.base.join("/api/play-url")?;
        let body = self
            .client
            .post_form(endpoint.as_str(), &[("id", play_id)])
            .await?;
        let reply: PlayUrlReply = serde_json::from_slice(&body)?;
        if reply.code != SUCCESS_CODE {
            return Err(AdapterError::BackendCode {
                code: reply.code,
                message: "play-url refused".into(),
            });
        }
        reply
            .data
            .and_then(|data| data.url)
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .ok_or_else(|| AdapterError::Malformed("play-url reply without data.url".into()))
    }

    async fn try_resolve(&self, song_name: &str) -> Result<AdapterResult, AdapterError> {
        let detail = self.detail_href(song_name).await?;
        let play_id = self.play_id(&detail).await?;
        let url = self.play_url(&play_id).await?;
        Ok(AdapterResult {
            title: song_name.to_string(),
            url,
            verified_audio: false,
        })
    }
}

#[async_trait::async_trait]
impl SongAdapter for DetailPageAdapter {
    fn name(&self) -> &str {
        "detail-page"
    }

    async fn resolve(&self, song_name: &str) -> Option<AdapterResult> {
        match self.try_resolve(song_name).await {
            Ok(result) => Some(result),
            Err(err) => {
                music_warn!(
                    "{} failed for {:?} at {}: {}",
                    self.name(),
                    song_name,
                    self.base,
                    err
                );
                None
            }
        }
    }
}
