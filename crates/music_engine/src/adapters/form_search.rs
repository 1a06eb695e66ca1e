use music_logging::{music_debug, music_warn};
use serde::Deserialize;

use super::{AdapterError, SongAdapter};
use crate::http::{is_audio_content_type, HttpClient};
use crate::AdapterResult;

const SUCCESS_CODE: i64 = 200;

#[derive(Debug, Deserialize)]
struct SearchReply {
    code: i64,
    #[serde(default)]
    data: Option<Vec<SearchHit>>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
    url: String,
}

/// Form-encoded search returning candidate tracks with direct stream URLs.
///
/// Candidates are probed in order; the first one served as audio wins.
pub struct FormSearchAdapter {
    client: HttpClient,
    endpoint: String,
}

impl FormSearchAdapter {
    pub fn new(client: HttpClient, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    async fn try_resolve(&self, song_name: &str) -> Result<AdapterResult, AdapterError> {
        let fields = [
            ("input", song_name),
            ("filter", "name"),
            ("type", "migu"),
            ("page", "1"),
        ];
        let body = self.client.post_form(&self.endpoint, &fields).await?;
        let reply: SearchReply = serde_json::from_slice(&body)?;
        if reply.code != SUCCESS_CODE {
            return Err(AdapterError::BackendCode {
                code: reply.code,
                message: reply.error.unwrap_or_default(),
            });
        }

        for hit in reply.data.unwrap_or_default() {
            match self.client.probe_content_type(&hit.url).await {
                Ok(Some(ct)) if is_audio_content_type(&ct) => {
                    return Ok(AdapterResult {
                        title: hit.title,
                        url: hit.url,
                        verified_audio: true,
                    });
                }
                Ok(ct) => {
                    music_debug!("candidate {} is not audio ({:?})", hit.url, ct);
                }
                Err(err) => {
                    music_debug!("candidate {} unreachable: {}", hit.url, err);
                }
            }
        }
        Err(AdapterError::NoAudioCandidate)
    }
}

#[async_trait::async_trait]
impl SongAdapter for FormSearchAdapter {
    fn name(&self) -> &str {
        "form-search"
    }

    async fn resolve(&self, song_name: &str) -> Option<AdapterResult> {
        match self.try_resolve(song_name).await {
            Ok(result) => Some(result),
            Err(err) => {
                music_warn!(
                    "{} failed for {:?} at {}: {}",
                    self.name(),
                    song_name,
                    self.endpoint,
                    err
                );
                None
            }
        }
    }
}
