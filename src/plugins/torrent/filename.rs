//! Local file name for a downloaded torrent.

use regex::Regex;
use sanitize_filename::sanitize;
use std::collections::HashMap;
use std::sync::LazyLock;
use url::Url;

static FILENAME_EXT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)filename\*\s*=\s*[\w-]*'[^']*'([^;]+)").expect("Invalid filename* pattern")
});

static FILENAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)filename="?(.+)"?"#).expect("Invalid filename pattern"));

/// Picks a file name from `Content-Disposition`, then from a URL ending in
/// `.torrent`, and otherwise from the current time. Never empty.
pub fn torrent_filename(headers: &HashMap<String, String>, url: &str) -> String {
    headers
        .get("content-disposition")
        .and_then(|d| from_disposition(d))
        .or_else(|| from_url(url))
        .unwrap_or_else(timestamp_name)
}

/// [`torrent_filename`] made safe to join onto a directory. Names that
/// sanitize to nothing (`..`, `/`) get the timestamp name instead.
pub fn local_filename(headers: &HashMap<String, String>, url: &str) -> String {
    let name = sanitize(torrent_filename(headers, url));
    if name.is_empty() {
        sanitize(timestamp_name())
    } else {
        name
    }
}

fn timestamp_name() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.6f").to_string()
}

fn from_disposition(disposition: &str) -> Option<String> {
    if let Some(c) = FILENAME_EXT_PATTERN.captures(disposition) {
        let name = percent_decode(c[1].trim());
        if !name.is_empty() {
            return Some(name);
        }
    }

    let raw = FILENAME_PATTERN.captures(disposition)?.get(1)?.as_str();
    let fixed = undo_latin1(raw);
    let first = fixed.split(';').next().unwrap_or_default().trim();
    let decoded = percent_decode(first);
    let name = decoded.strip_suffix('"').unwrap_or(&decoded);
    (!name.is_empty()).then(|| name.to_string())
}

fn from_url(url: &str) -> Option<String> {
    let last = match Url::parse(url) {
        Ok(u) => u.path_segments().and_then(|s| s.last()).map(|s| s.to_string())?,
        Err(_) => url.rsplit('/').next()?.to_string(),
    };
    if !last.to_ascii_lowercase().ends_with(".torrent") {
        return None;
    }
    Some(percent_decode(&last))
}

/// Servers often send UTF-8 names raw in headers, which arrive as one
/// char per byte. Re-assemble the bytes and decode them as UTF-8 when valid.
fn undo_latin1(s: &str) -> String {
    if s.chars().any(|c| c as u32 > 0xFF) {
        return s.to_string();
    }
    let bytes: Vec<u8> = s.chars().map(|c| c as u8).collect();
    String::from_utf8(bytes).unwrap_or_else(|_| s.to_string())
}

fn percent_decode(s: &str) -> String {
    String::from_utf8_lossy(&urlencoding::decode_binary(s.as_bytes())).into_owned()
}
