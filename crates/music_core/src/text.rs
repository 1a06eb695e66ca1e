/// Removes every character that is neither a word character nor whitespace,
/// then trims the result.
///
/// Word characters are Unicode letters, digits and `_`, so CJK text survives intact.
pub fn clean_command_text(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Extracts the song-name hint that follows the first matching keyword.
///
/// Keywords are tried in priority order. The first keyword present in `cleaned`
/// decides the outcome: the trimmed text after its first occurrence, or `None`
/// when nothing follows it.
pub fn extract_hint<S: AsRef<str>>(cleaned: &str, keywords: &[S]) -> Option<String> {
    let keyword = keywords
        .iter()
        .map(AsRef::as_ref)
        .filter(|k| !k.is_empty())
        .find(|k| cleaned.contains(k))?;
    let (_, rest) = cleaned.split_once(keyword)?;
    let hint = rest.trim();
    if hint.is_empty() {
        None
    } else {
        Some(hint.to_string())
    }
}

/// True when `text` contains any of the non-empty `phrases`.
pub fn contains_any<S: AsRef<str>>(text: &str, phrases: &[S]) -> bool {
    phrases
        .iter()
        .map(AsRef::as_ref)
        .any(|p| !p.is_empty() && text.contains(p))
}
