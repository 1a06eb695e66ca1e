use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};

use crate::charset::decode_page;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=UTF-8";

#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Option<Duration>,
    pub redirect_limit: usize,
    /// Cap for search pages and JSON replies.
    pub max_page_bytes: u64,
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
            redirect_limit: 5,
            max_page_bytes: 2 * 1024 * 1024,
            user_agent: concat!("music_engine/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HttpError {
    #[error("invalid url {url}: {message}")]
    InvalidUrl { url: String, message: String },
    #[error("http status {0}")]
    Status(u16),
    #[error("timeout: {0}")]
    Timeout(String),
    #[error("redirect limit exceeded: {0}")]
    RedirectLimitExceeded(String),
    #[error("response too large (max {max_bytes}, actual {actual:?})")]
    TooLarge { max_bytes: u64, actual: Option<u64> },
    #[error("undecodable body: {0}")]
    Body(String),
    #[error("network error: {0}")]
    Network(String),
}

/// Shared client plus the limits every backend request obeys.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    max_page_bytes: u64,
}

impl HttpClient {
    pub fn new(settings: &HttpSettings) -> Result<Self, HttpError> {
        let redirect_limit = settings.redirect_limit;
        let policy = reqwest::redirect::Policy::custom(move |attempt| {
            if attempt.previous().len() >= redirect_limit {
                attempt.error("redirect limit exceeded")
            } else {
                attempt.follow()
            }
        });

        let mut builder = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .redirect(policy);
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }

        let mut headers = reqwest::header::HeaderMap::new();
        if let Ok(value) = settings.user_agent.parse() {
            headers.insert(USER_AGENT, value);
        }

        let client = builder
            .default_headers(headers)
            .build()
            .map_err(|err| HttpError::Network(err.to_string()))?;
        Ok(Self {
            client,
            max_page_bytes: settings.max_page_bytes,
        })
    }

    pub fn inner(&self) -> &reqwest::Client {
        &self.client
    }

    /// GET a page and decode it to text using its declared or detected charset.
    pub async fn get_text(&self, url: &str) -> Result<String, HttpError> {
        let parsed = parse_url(url)?;
        let response = self
            .client
            .get(parsed)
            .header("x-requested-with", "XMLHttpRequest")
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = ensure_success(response)?;
        let content_type = content_type(&response);
        let bytes = read_limited(response, self.max_page_bytes).await?;
        decode_page(&bytes, content_type.as_deref()).map_err(|err| HttpError::Body(err.to_string()))
    }

    /// POST url-encoded `fields` and return the raw reply body.
    pub async fn post_form(&self, url: &str, fields: &[(&str, &str)]) -> Result<Vec<u8>, HttpError> {
        let parsed = parse_url(url)?;
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields.iter().copied())
            .finish();
        let response = self
            .client
            .post(parsed)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .header("x-requested-with", "XMLHttpRequest")
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = ensure_success(response)?;
        read_limited(response, self.max_page_bytes).await
    }

    /// GET `url` and report its content type without reading the body.
    pub async fn probe_content_type(&self, url: &str) -> Result<Option<String>, HttpError> {
        let parsed = parse_url(url)?;
        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = ensure_success(response)?;
        Ok(content_type(&response))
    }
}

pub fn is_audio_content_type(content_type: &str) -> bool {
    let mime = content_type.split(';').next().unwrap_or(content_type).trim();
    mime.len() > "audio/".len()
        && mime
            .get(.."audio/".len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("audio/"))
}

pub(crate) fn parse_url(url: &str) -> Result<reqwest::Url, HttpError> {
    reqwest::Url::parse(url).map_err(|err| HttpError::InvalidUrl {
        url: url.to_string(),
        message: err.to_string(),
    })
}

pub(crate) fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, HttpError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(HttpError::Status(status.as_u16()))
    }
}

pub(crate) fn content_type(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
}

async fn read_limited(response: reqwest::Response, max_bytes: u64) -> Result<Vec<u8>, HttpError> {
    if let Some(content_len) = response.content_length() {
        if content_len > max_bytes {
            return Err(HttpError::TooLarge {
                max_bytes,
                actual: Some(content_len),
            });
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(map_reqwest_error)?;
        let next_len = bytes.len() as u64 + chunk.len() as u64;
        if next_len > max_bytes {
            return Err(HttpError::TooLarge {
                max_bytes,
                actual: Some(next_len),
            });
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> HttpError {
    if err.is_timeout() {
        return HttpError::Timeout(err.to_string());
    }
    if err.is_redirect() {
        return HttpError::RedirectLimitExceeded(err.to_string());
    }
    HttpError::Network(err.to_string())
}
