use bytes::Bytes;
use std::collections::HashMap;
use std::path::PathBuf;

pub const MAGNET_PREFIX: &str = "magnet:";

pub fn is_magnet(s: &str) -> bool {
    s.starts_with(MAGNET_PREFIX)
}

/// Raw response handed back by an `HttpClient`.
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status: u16,
    /// Header names are lower-cased.
    pub headers: HashMap<String, String>,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(|s| s.as_str())
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self.status, 301 | 302)
    }

    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TorrentContent {
    Magnet(String),
    Bytes(Bytes),
}

/// Outcome of one `TorrentResolver::resolve` call.
///
/// On success either `content` is a magnet, or `file_path` and `content`
/// (bytes) are both set. On failure every content field is empty and
/// `error_message` says why.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionResult {
    pub file_path: Option<PathBuf>,
    pub content: Option<TorrentContent>,
    pub root_name: String,
    pub file_list: Vec<String>,
    pub error_message: String,
}

impl ResolutionResult {
    pub fn magnet(uri: impl Into<String>) -> Self {
        Self { content: Some(TorrentContent::Magnet(uri.into())), ..Default::default() }
    }

    pub fn torrent(file_path: PathBuf, bytes: Bytes, root_name: String, file_list: Vec<String>) -> Self {
        Self {
            file_path: Some(file_path),
            content: Some(TorrentContent::Bytes(bytes)),
            root_name,
            file_list,
            error_message: String::new(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self { error_message: message.into(), ..Default::default() }
    }

    pub fn is_success(&self) -> bool {
        self.content.is_some()
    }

    pub fn magnet_uri(&self) -> Option<&str> {
        match &self.content {
            Some(TorrentContent::Magnet(m)) => Some(m),
            _ => None,
        }
    }

    pub fn torrent_bytes(&self) -> Option<&Bytes> {
        match &self.content {
            Some(TorrentContent::Bytes(b)) => Some(b),
            _ => None,
        }
    }
}

/// Name and file list read from a `.torrent` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TorrentInfo {
    pub name: String,
    pub files: Vec<String>,
}

/// What a `MetadataExtractor` found in a single file name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaMeta {
    pub begin_episode: Option<u32>,
    pub episodes: Vec<u32>,
    pub seasons: Vec<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Movie,
    Tv,
    Unknown,
}

/// Logical media a candidate was matched to.
#[derive(Debug, Clone)]
pub struct MediaIdentity {
    pub title: String,
    pub year: Option<String>,
    pub media_type: MediaType,
    pub seasons: Vec<u32>,
    pub episodes: Vec<u32>,
}

impl MediaIdentity {
    /// "Title (Year)", or just the title when the year is unknown.
    pub fn title_string(&self) -> String {
        match self.year.as_deref().filter(|y| !y.is_empty()) {
            Some(year) => format!("{} ({})", self.title, year),
            None => self.title.clone(),
        }
    }

    /// e.g. "S01 E01-E03", "S01-S02", "E05"; empty when nothing is known.
    pub fn season_episode_string(&self) -> String {
        let season = span_string('S', &self.seasons);
        let episode = span_string('E', &self.episodes);
        match (season.is_empty(), episode.is_empty()) {
            (false, false) => format!("{} {}", season, episode),
            (false, true) => season,
            _ => episode,
        }
    }

    pub fn dedup_key(&self) -> String {
        match self.media_type {
            MediaType::Movie => self.title_string(),
            _ => format!("{}{}", self.title_string(), self.season_episode_string()),
        }
    }
}

fn span_string(tag: char, values: &[u32]) -> String {
    let (Some(first), Some(last)) = (values.iter().min(), values.iter().max()) else {
        return String::new();
    };
    if first == last {
        format!("{tag}{first:02}")
    } else {
        format!("{tag}{first:02}-{tag}{last:02}")
    }
}

/// Site-side facts about a torrent listing.
#[derive(Debug, Clone)]
pub struct TorrentDescriptor {
    pub title: String,
    pub pri_order: u32,
    pub seeders: u32,
}

#[derive(Debug, Clone)]
pub struct Candidate {
    pub media: MediaIdentity,
    pub torrent: TorrentDescriptor,
}
