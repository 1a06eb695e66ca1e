use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use music_core::{clean_command_text, plan_command, CatalogSnapshot, CommandRules, RoutePlan};
use music_logging::{music_debug, music_error, music_info, music_warn};
use rand::seq::IndexedRandom;
use tokio_util::sync::CancellationToken;

use crate::adapters::{AdapterChain, SongAdapter};
use crate::catalog_store::CatalogStore;
use crate::config::{ConfigError, MusicConfig};
use crate::dispatch::{PlaybackDispatcher, SessionHandle};
use crate::download::{AssetDownloader, DownloadError, HttpDownloader};
use crate::events::{emit_stage, EventSink};
use crate::http::HttpClient;
use crate::{CommandOutcome, FailureKind, MusicEvent, PlayedTrack, RequestId, Stage, TrackSource};

/// Entry point for music commands, shared by every session of the process.
pub struct MusicCommandRouter {
    config: MusicConfig,
    catalog: Arc<CatalogStore>,
    resolver: Arc<dyn SongAdapter>,
    downloader: Arc<dyn AssetDownloader>,
    dispatcher: PlaybackDispatcher,
    events: Arc<dyn EventSink>,
    next_request: AtomicU64,
}

impl MusicCommandRouter {
    pub fn new(
        config: MusicConfig,
        resolver: Arc<dyn SongAdapter>,
        downloader: Arc<dyn AssetDownloader>,
        dispatcher: PlaybackDispatcher,
        events: Arc<dyn EventSink>,
    ) -> Self {
        let catalog = Arc::new(CatalogStore::new(
            config.music_dir.clone(),
            config.music_ext.clone(),
            config.refresh_interval(),
        ));
        Self {
            config,
            catalog,
            resolver,
            downloader,
            dispatcher,
            events,
            next_request: AtomicU64::new(1),
        }
    }

    /// Wires the HTTP backends, downloader and default decoders from `config`.
    pub fn from_config(config: MusicConfig, events: Arc<dyn EventSink>) -> Result<Self, ConfigError> {
        config.validate()?;
        let client = HttpClient::new(&config.http.to_settings())
            .map_err(|err| ConfigError::Client(err.to_string()))?;
        let mut chain = AdapterChain::from_backends(&config.backends, &client)
            .map_err(|err| ConfigError::Invalid(format!("backend url: {err}")))?;
        if config.verify_audio_content_type {
            chain = chain.with_verifier(client.clone());
        }
        let downloader = HttpDownloader::new(
            client,
            config.music_cache_dir.clone(),
            config.http.max_download_bytes,
        );
        let dispatcher = PlaybackDispatcher::with_default_decoders(config.announce_template.clone());
        Ok(Self::new(
            config,
            Arc::new(chain),
            Arc::new(downloader),
            dispatcher,
            events,
        ))
    }

    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    /// Catalog snapshot for a command arriving at `now`, or `None` when the
    /// music root is missing. A stale catalog is rescanned on the blocking pool.
    pub async fn refresh_catalog(&self, now: Instant) -> Option<Arc<CatalogSnapshot>> {
        if !self.catalog.root_exists() {
            music_debug!("catalog unavailable: {:?} is not a directory", self.catalog.root());
            return None;
        }
        let current = self.catalog.snapshot();
        if !current.is_stale(now, self.catalog.refresh_interval()) {
            return Some(current);
        }
        let store = Arc::clone(&self.catalog);
        match tokio::task::spawn_blocking(move || store.available_snapshot(now)).await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                music_error!("catalog rescan task failed: {}", err);
                Some(current)
            }
        }
    }

    /// Handle one utterance. Returns `NotHandled` when the text is not a music
    /// command; accepted commands that fail are reported as `Failed`.
    pub async fn handle_command(
        &self,
        session: &dyn SessionHandle,
        text: &str,
        cancel: &CancellationToken,
    ) -> CommandOutcome {
        let cleaned = clean_command_text(text);
        music_debug!("checking music command: {:?}", cleaned);

        let snapshot = self.refresh_catalog(Instant::now()).await;
        let rules = CommandRules {
            hint_keywords: &self.config.hint_keywords,
            generic_triggers: &self.config.music_commands,
        };
        let plan = plan_command(&cleaned, rules, snapshot.as_deref());

        let (request_id, result) = match plan {
            RoutePlan::NotHandled => return CommandOutcome::NotHandled,
            RoutePlan::PlayLocal(found) => {
                let id = self.next_request_id();
                music_info!("best local match {:?} (score {:.2})", found.entry, found.score);
                (id, self.play_local(id, session, &found.entry, cancel).await)
            }
            RoutePlan::ResolveHint(name) => {
                let id = self.next_request_id();
                music_info!("no local match for {:?}, resolving online", name);
                (id, self.play_network(id, session, &name, cancel).await)
            }
            RoutePlan::ResolveFallback => {
                let id = self.next_request_id();
                let result = match self.pick_fallback_title() {
                    Some(title) => self.play_network(id, session, &title, cancel).await,
                    None => Err(FailureKind::NoMatch),
                };
                (id, result)
            }
        };
        self.complete(request_id, result)
    }

    fn next_request_id(&self) -> RequestId {
        self.next_request.fetch_add(1, Ordering::Relaxed)
    }

    /// Play a uniformly random entry of the local catalog.
    pub async fn play_random_local(
        &self,
        session: &dyn SessionHandle,
        cancel: &CancellationToken,
    ) -> CommandOutcome {
        let request_id = self.next_request_id();
        let result = match self.refresh_catalog(Instant::now()).await {
            None => Err(FailureKind::CatalogUnavailable),
            Some(snapshot) => {
                let picked = snapshot.entries().choose(&mut rand::rng()).cloned();
                match picked {
                    Some(entry) => self.play_local(request_id, session, &entry, cancel).await,
                    None => {
                        music_warn!("catalog {:?} has no playable files", self.catalog.root());
                        Err(FailureKind::NoMatch)
                    }
                }
            }
        };
        self.complete(request_id, result)
    }

    fn pick_fallback_title(&self) -> Option<String> {
        let title = self
            .config
            .fallback_playlist
            .iter()
            .filter(|t| !t.trim().is_empty())
            .collect::<Vec<_>>()
            .choose(&mut rand::rng())
            .map(|t| t.to_string());
        if title.is_none() {
            music_error!("fallback playlist is empty");
        }
        title
    }

    async fn play_local(
        &self,
        request_id: RequestId,
        session: &dyn SessionHandle,
        entry: &Path,
        cancel: &CancellationToken,
    ) -> Result<PlayedTrack, FailureKind> {
        emit_stage(self.events.as_ref(), request_id, Stage::MatchingLocal, None);
        let path = self.catalog.root().join(entry);
        if !path.is_file() {
            music_error!("catalog entry vanished: {:?}", path);
            return Err(FailureKind::CatalogUnavailable);
        }
        let title = entry
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| entry.to_string_lossy().into_owned());

        let duration = self
            .decode_and_dispatch(request_id, session, &path, &title, cancel)
            .await?;
        Ok(PlayedTrack {
            title,
            path,
            source: TrackSource::Local,
            duration,
        })
    }

    async fn play_network(
        &self,
        request_id: RequestId,
        session: &dyn SessionHandle,
        song_name: &str,
        cancel: &CancellationToken,
    ) -> Result<PlayedTrack, FailureKind> {
        emit_stage(self.events.as_ref(), request_id, Stage::Resolving, None);
        let resolved = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(FailureKind::Cancelled),
            resolved = self.resolver.resolve(song_name) => resolved,
        };
        let Some(resolved) = resolved else {
            music_error!("failed to resolve a stream for {:?}", song_name);
            return Err(FailureKind::AdapterFailure);
        };

        let asset = self
            .downloader
            .download(request_id, &resolved, self.events.as_ref(), cancel)
            .await
            .map_err(|err| match err {
                DownloadError::Cancelled => FailureKind::Cancelled,
                other => {
                    music_error!("download of {} failed: {}", resolved.url, other);
                    FailureKind::DownloadFailure
                }
            })?;

        let duration = self
            .decode_and_dispatch(request_id, session, &asset.path, &resolved.title, cancel)
            .await?;
        Ok(PlayedTrack {
            title: resolved.title,
            path: asset.path,
            source: TrackSource::Network { url: resolved.url },
            duration,
        })
    }

    async fn decode_and_dispatch(
        &self,
        request_id: RequestId,
        session: &dyn SessionHandle,
        path: &Path,
        title: &str,
        cancel: &CancellationToken,
    ) -> Result<Duration, FailureKind> {
        emit_stage(self.events.as_ref(), request_id, Stage::Decoding, None);
        let decoded = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(FailureKind::Cancelled),
            decoded = self.dispatcher.decode(path) => decoded,
        };
        let decoded = decoded.map_err(|err| {
            music_error!("failed to decode {:?}: {}", path, err);
            FailureKind::DecodeFailure
        })?;

        // Past this point cancellation no longer applies.
        let duration = self.dispatcher.deliver(session, decoded, title).await;
        emit_stage(self.events.as_ref(), request_id, Stage::Dispatched, None);
        Ok(duration)
    }

    fn complete(&self, request_id: RequestId, result: Result<PlayedTrack, FailureKind>) -> CommandOutcome {
        self.events.emit(MusicEvent::CommandCompleted {
            request_id,
            result: result.clone(),
        });
        match result {
            Ok(track) => CommandOutcome::Played(track),
            Err(kind) => {
                music_debug!("music request {} ended without playback", request_id);
                CommandOutcome::Failed(kind)
            }
        }
    }
}
