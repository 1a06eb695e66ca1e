use music_logging::{music_debug, music_info, music_warn};

use super::{DetailPageAdapter, FormSearchAdapter, SongAdapter};
use crate::config::{BackendConfig, BackendKind};
use crate::http::{is_audio_content_type, HttpClient};
use crate::AdapterResult;

/// Backends in priority order; the first usable result wins.
///
/// With a verifier configured, a result whose URL is not served as audio counts
/// as a failure of that backend only and the next backend is tried.
pub struct AdapterChain {
    adapters: Vec<Box<dyn SongAdapter>>,
    verifier: Option<HttpClient>,
}

impl AdapterChain {
    pub fn new(adapters: Vec<Box<dyn SongAdapter>>) -> Self {
        Self {
            adapters,
            verifier: None,
        }
    }

    /// Probe each accepted URL's content type with `client` before returning it.
    pub fn with_verifier(mut self, client: HttpClient) -> Self {
        self.verifier = Some(client);
        self
    }

    pub fn from_backends(
        backends: &[BackendConfig],
        client: &HttpClient,
    ) -> Result<Self, url::ParseError> {
        let mut adapters: Vec<Box<dyn SongAdapter>> = Vec::with_capacity(backends.len());
        for backend in backends {
            match backend.kind {
                BackendKind::FormSearch => adapters.push(Box::new(FormSearchAdapter::new(
                    client.clone(),
                    backend.base_url.clone(),
                ))),
                BackendKind::DetailPage => adapters.push(Box::new(DetailPageAdapter::new(
                    client.clone(),
                    &backend.base_url,
                )?)),
            }
        }
        Ok(Self::new(adapters))
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// `Some(true)` verified audio, `Some(false)` rejected, `None` no content type.
    async fn verify(&self, client: &HttpClient, url: &str) -> Option<bool> {
        match client.probe_content_type(url).await {
            Ok(Some(ct)) => Some(is_audio_content_type(&ct)),
            Ok(None) => None,
            Err(err) => {
                music_debug!("verification request for {} failed: {}", url, err);
                Some(false)
            }
        }
    }
}

#[async_trait::async_trait]
impl SongAdapter for AdapterChain {
    fn name(&self) -> &str {
        "chain"
    }

    async fn resolve(&self, song_name: &str) -> Option<AdapterResult> {
        for adapter in &self.adapters {
            let Some(mut result) = adapter.resolve(song_name).await else {
                continue;
            };
            if let (Some(client), false) = (&self.verifier, result.verified_audio) {
                match self.verify(client, &result.url).await {
                    Some(true) => result.verified_audio = true,
                    Some(false) => {
                        music_warn!(
                            "{} returned a non-audio url for {:?}: {}",
                            adapter.name(),
                            song_name,
                            result.url
                        );
                        continue;
                    }
                    None => music_debug!("{} has no content type, accepting", result.url),
                }
            }
            music_info!("{} resolved {:?} to {}", adapter.name(), song_name, result.url);
            return Some(result);
        }
        music_warn!("no backend resolved {:?}", song_name);
        None
    }
}
