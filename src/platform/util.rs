use std::sync::LazyLock;

use regex::Regex;

static URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)https?://[^\s]+").expect("URL regex must compile"));

/// Picks the video link out of a chat message.
///
/// Commands and empty texts never count. A message counts as a link when it contains one
/// of `domains`; the first URL mentioning that domain is returned, or the whole trimmed
/// text when it carries no scheme (e.g. `youtu.be/abc`).
pub fn extract_video_link(text: &str, domains: &[String]) -> Option<String> {
    let text = text.trim();
    if text.is_empty() || text.starts_with('/') {
        return None;
    }

    let lowered = text.to_lowercase();
    if !domains.iter().any(|domain| lowered.contains(domain.as_str())) {
        return None;
    }

    let url = URL_REGEX
        .find_iter(text)
        .map(|m| m.as_str())
        .find(|candidate| {
            let candidate = candidate.to_lowercase();
            domains.iter().any(|domain| candidate.contains(domain.as_str()))
        })
        .unwrap_or(text);

    Some(url.to_string())
}
