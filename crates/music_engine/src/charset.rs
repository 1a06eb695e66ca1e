use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("failed to decode page as {encoding}")]
pub struct CharsetError {
    pub encoding: String,
}

/// Decode page bytes into a string: BOM -> Content-Type charset -> valid UTF-8 -> chardetng guess.
///
/// Search pages for CJK titles are short, so valid UTF-8 is taken as-is before
/// falling back to detection.
pub fn decode_page(bytes: &[u8], content_type: Option<&str>) -> Result<String, CharsetError> {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return decode_with(bytes, encoding);
    }

    if let Some(enc) = content_type
        .and_then(charset_label)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
    {
        return decode_with(bytes, enc);
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return Ok(text.to_string());
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    decode_with(bytes, detector.guess(None, true))
}

fn charset_label(content_type: &str) -> Option<String> {
    content_type.split(';').find_map(|part| {
        let (key, value) = part.split_once('=')?;
        if key.trim().eq_ignore_ascii_case("charset") {
            Some(value.trim().trim_matches(['"', '\'']).to_string())
        } else {
            None
        }
    })
}

fn decode_with(bytes: &[u8], enc: &'static Encoding) -> Result<String, CharsetError> {
    let (text, _, had_errors) = enc.decode(bytes);
    if had_errors && enc != UTF_8 {
        return Err(CharsetError {
            encoding: enc.name().to_string(),
        });
    }
    Ok(text.into_owned())
}
