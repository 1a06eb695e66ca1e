use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

static PLAY_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"window\.play_id\s*=\s*['"]([^'"]+)['"]"#).expect("play_id pattern is valid")
});

/// Anchor text that marks a search hit's detail link on the detail-page backend.
pub const DOWNLOAD_MARKER: &str = "播放&下载";

/// `href` of the first anchor whose text contains `marker`.
///
/// Entities are decoded before comparison, so `播放&amp;下载` matches.
pub fn find_marked_anchor(html: &str, marker: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let selector = Selector::parse("a[href]").ok()?;
    doc.select(&selector)
        .find(|anchor| anchor.text().collect::<String>().contains(marker))
        .and_then(|anchor| anchor.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .map(str::to_string)
}

/// Value assigned to `window.play_id` in an inline script, e.g.
/// `window.play_id = 'abc123';`.
pub fn extract_play_id(html: &str) -> Option<String> {
    PLAY_ID
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|id| id.as_str().to_string())
}
