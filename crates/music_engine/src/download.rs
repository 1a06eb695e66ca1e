use std::path::PathBuf;

use futures_util::StreamExt;
use music_logging::music_debug;
use tokio_util::sync::CancellationToken;

use crate::events::{emit_stage, EventSink};
use crate::filename::cache_filename;
use crate::http::{content_type, ensure_success, map_reqwest_error, parse_url, HttpClient, HttpError};
use crate::persist::{ensure_cache_dir, prune_siblings, PersistError, StagedFile};
use crate::{AdapterResult, CachedAsset, RequestId, Stage};

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error("download cancelled")]
    Cancelled,
}

#[async_trait::async_trait]
pub trait AssetDownloader: Send + Sync {
    async fn download(
        &self,
        request_id: RequestId,
        track: &AdapterResult,
        sink: &dyn EventSink,
        cancel: &CancellationToken,
    ) -> Result<CachedAsset, DownloadError>;
}

/// Streams a resolved track into the cache directory.
///
/// Each download writes its own temp file and is renamed into place only after
/// the last chunk, so concurrent sessions never share a partially written file.
pub struct HttpDownloader {
    client: HttpClient,
    cache_dir: PathBuf,
    max_bytes: u64,
}

impl HttpDownloader {
    pub fn new(client: HttpClient, cache_dir: PathBuf, max_bytes: u64) -> Self {
        Self {
            client,
            cache_dir,
            max_bytes,
        }
    }

    pub fn cache_dir(&self) -> &PathBuf {
        &self.cache_dir
    }
}

#[async_trait::async_trait]
impl AssetDownloader for HttpDownloader {
    async fn download(
        &self,
        request_id: RequestId,
        track: &AdapterResult,
        sink: &dyn EventSink,
        cancel: &CancellationToken,
    ) -> Result<CachedAsset, DownloadError> {
        ensure_cache_dir(&self.cache_dir)?;
        let url = parse_url(&track.url)?;

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(DownloadError::Cancelled),
            sent = self.client.inner().get(url).send() => sent.map_err(map_reqwest_error)?,
        };
        let response = ensure_success(response)?;

        if let Some(content_len) = response.content_length() {
            if content_len > self.max_bytes {
                return Err(HttpError::TooLarge {
                    max_bytes: self.max_bytes,
                    actual: Some(content_len),
                }
                .into());
            }
        }
        let content_type = content_type(&response);

        emit_stage(sink, request_id, Stage::Downloading, Some(0));
        let mut staged = StagedFile::new_in(&self.cache_dir)?;
        let mut stream = response.bytes_stream();
        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(DownloadError::Cancelled),
                next = stream.next() => next,
            };
            let Some(chunk) = next else {
                break;
            };
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = staged.written() + chunk.len() as u64;
            if next_len > self.max_bytes {
                return Err(HttpError::TooLarge {
                    max_bytes: self.max_bytes,
                    actual: Some(next_len),
                }
                .into());
            }
            staged.write_chunk(&chunk)?;
            emit_stage(sink, request_id, Stage::Downloading, Some(staged.written()));
        }

        let bytes = staged.written();
        let target = self.cache_dir.join(cache_filename(&track.title, &track.url));
        let path = staged.commit(&target)?;
        let pruned = prune_siblings(&path)?;
        music_debug!(
            "downloaded {} bytes from {} to {:?}, replaced {} older copies",
            bytes,
            track.url,
            path,
            pruned
        );

        Ok(CachedAsset {
            path,
            bytes,
            content_type,
        })
    }
}
