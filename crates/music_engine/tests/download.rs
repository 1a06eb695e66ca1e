use std::fs;
use std::path::Path;
use std::sync::mpsc;

use music_engine::{
    cache_filename, AdapterResult, AssetDownloader, ChannelEventSink, DownloadError, HttpClient,
    HttpDownloader, HttpError, HttpSettings, MusicEvent, Stage,
};
use pretty_assertions::assert_eq;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MAX_BYTES: u64 = 1024 * 1024;

fn downloader(cache: &Path, max_bytes: u64) -> HttpDownloader {
    let client = HttpClient::new(&HttpSettings::default()).expect("client");
    HttpDownloader::new(client, cache.to_path_buf(), max_bytes)
}

fn track(title: &str, url: String) -> AdapterResult {
    AdapterResult {
        title: title.to_string(),
        url,
        verified_audio: true,
    }
}

fn file_names(dir: &Path) -> Vec<String> {
    if !dir.exists() {
        return Vec::new();
    }
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn download_writes_cache_file_and_reports_progress() {
    let server = MockServer::start().await;
    let body = vec![7u8; 4096];
    Mock::given(method("GET"))
        .and(path("/song.mp3"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.clone(), "audio/mpeg"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let cache = dir.path().join("cache");
    let (tx, rx) = mpsc::channel();
    let sink = ChannelEventSink::new(tx);
    let url = format!("{}/song.mp3", server.uri());

    let asset = downloader(&cache, MAX_BYTES)
        .download(3, &track("小幸运", url.clone()), &sink, &CancellationToken::new())
        .await
        .expect("download ok");

    assert_eq!(asset.path, cache.join(cache_filename("小幸运", &url)));
    assert_eq!(asset.bytes, 4096);
    assert_eq!(asset.content_type.as_deref(), Some("audio/mpeg"));
    assert_eq!(fs::read(&asset.path).unwrap(), body);
    assert_eq!(file_names(&cache).len(), 1);

    let progress: Vec<_> = rx
        .try_iter()
        .filter_map(|event| match event {
            MusicEvent::Progress(p) => Some(p),
            _ => None,
        })
        .collect();
    assert!(progress.iter().all(|p| p.request_id == 3 && p.stage == Stage::Downloading));
    assert_eq!(progress.first().and_then(|p| p.bytes), Some(0));
    assert_eq!(progress.last().and_then(|p| p.bytes), Some(4096));
}

#[tokio::test]
async fn http_error_leaves_no_file_behind() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let (tx, _rx) = mpsc::channel();
    let err = downloader(dir.path(), MAX_BYTES)
        .download(
            1,
            &track("晴天", format!("{}/missing.mp3", server.uri())),
            &ChannelEventSink::new(tx),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, DownloadError::Http(HttpError::Status(404))));
    assert!(file_names(dir.path()).is_empty());
}

#[tokio::test]
async fn declared_length_over_limit_is_refused() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![1u8; 2048], "audio/mpeg"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let (tx, _rx) = mpsc::channel();
    let err = downloader(dir.path(), 1000)
        .download(
            1,
            &track("晴天", format!("{}/big.mp3", server.uri())),
            &ChannelEventSink::new(tx),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DownloadError::Http(HttpError::TooLarge { max_bytes: 1000, .. })
    ));
    assert!(file_names(dir.path()).is_empty());
}

#[tokio::test]
async fn connection_dropped_mid_stream_discards_partial_file() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = [0u8; 2048];
        let _ = socket.read(&mut request).await.unwrap();
        socket
            .write_all(
                b"HTTP/1.1 200 OK\r\nContent-Type: audio/mpeg\r\nContent-Length: 1000\r\n\r\n",
            )
            .await
            .unwrap();
        socket.write_all(&[9u8; 100]).await.unwrap();
        socket.flush().await.unwrap();
    });

    let dir = tempfile::tempdir().unwrap();
    let (tx, _rx) = mpsc::channel();
    let result = downloader(dir.path(), MAX_BYTES)
        .download(
            1,
            &track("一点", format!("http://{addr}/cut.mp3")),
            &ChannelEventSink::new(tx),
            &CancellationToken::new(),
        )
        .await;
    server.await.unwrap();

    assert!(matches!(result, Err(DownloadError::Http(_))));
    assert!(file_names(dir.path()).is_empty());
}

#[tokio::test]
async fn cancelled_download_returns_cancelled() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![1u8; 16], "audio/mpeg"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();
    let (tx, _rx) = mpsc::channel();
    let err = downloader(dir.path(), MAX_BYTES)
        .download(
            1,
            &track("舍得", format!("{}/a.mp3", server.uri())),
            &ChannelEventSink::new(tx),
            &cancel,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, DownloadError::Cancelled));
    assert!(file_names(dir.path()).is_empty());
}

#[tokio::test]
async fn concurrent_downloads_of_one_track_leave_one_complete_file() {
    let server = MockServer::start().await;
    let body = vec![5u8; 8192];
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.clone(), "audio/mpeg"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let engine = downloader(dir.path(), MAX_BYTES);
    let song = track("唯一", format!("{}/only.mp3", server.uri()));
    let (tx, _rx) = mpsc::channel();
    let sink = ChannelEventSink::new(tx);
    let cancel = CancellationToken::new();

    let (a, b) = tokio::join!(
        engine.download(1, &song, &sink, &cancel),
        engine.download(2, &song, &sink, &cancel)
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_eq!(a.path, b.path);
    assert_eq!(fs::read(&a.path).unwrap(), body);
    assert_eq!(file_names(dir.path()).len(), 1);
}

#[tokio::test]
async fn repeated_downloads_of_one_title_keep_a_single_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![1u8; 512], "audio/mpeg"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let engine = downloader(dir.path(), MAX_BYTES);
    let (tx, _rx) = mpsc::channel();
    let sink = ChannelEventSink::new(tx);
    let cancel = CancellationToken::new();

    let mut last = None;
    for i in 0..5 {
        let ext = if i % 2 == 0 { "mp3" } else { "flac" };
        let song = track("晴天", format!("{}/a.{ext}?token={i}", server.uri()));
        last = Some(engine.download(i, &song, &sink, &cancel).await.unwrap());
    }

    assert_eq!(file_names(dir.path()), vec!["晴天.mp3".to_string()]);
    assert_eq!(last.unwrap().path, dir.path().join("晴天.mp3"));
}
