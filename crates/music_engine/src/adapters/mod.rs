//! Network backends that turn a song name into a playable stream URL.
mod chain;
mod detail_page;
mod form_search;

pub use chain::AdapterChain;
pub use detail_page::DetailPageAdapter;
pub use form_search::FormSearchAdapter;

use crate::http::HttpError;
use crate::AdapterResult;

/// One way of resolving a song name.
///
/// Implementations never fail loudly: every hop error is logged and turned
/// into `None`, so one broken backend cannot disturb the others.
#[async_trait::async_trait]
pub trait SongAdapter: Send + Sync {
    fn name(&self) -> &str;

    async fn resolve(&self, song_name: &str) -> Option<AdapterResult>;
}

/// Why a single backend attempt stopped.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error("malformed payload: {0}")]
    Malformed(String),
    #[error("backend answered code {code}: {message}")]
    BackendCode { code: i64, message: String },
    #[error("pattern not found: {0}")]
    PatternMissing(&'static str),
    #[error("no candidate served audio")]
    NoAudioCandidate,
}

impl From<serde_json::Error> for AdapterError {
    fn from(err: serde_json::Error) -> Self {
        AdapterError::Malformed(err.to_string())
    }
}

impl From<url::ParseError> for AdapterError {
    fn from(err: url::ParseError) -> Self {
        AdapterError::Malformed(format!("bad url: {err}"))
    }
}
