//! Season/episode numbers from release file names.
//!
//! Recognised forms, tried in order:
//! - `S01E02`, `S01E01-E03`, `S01E01E02`
//! - `第3集` / `第3话`
//! - `EP05`, `E05`, `EP01-EP12`
//! - `Title - 05 [1080p]`
//! - `[05]`

use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

use crate::core::model::MediaMeta;
use crate::plugins::registry::MetadataExtractor;

/// Ranges wider than this are treated as noise (years, resolutions).
const MAX_EPISODE_SPAN: u32 = 500;

static SXXEXX_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bS(\d{1,2})\s*E(\d{1,4})(?:\s*-\s*(?:S\d{1,2})?E?(\d{1,4})\b|E(\d{1,4}))?")
        .expect("Invalid SxxExx pattern")
});

static CN_EPISODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"第\s*(\d{1,4})\s*[集话話]").expect("Invalid CN episode pattern"));

static EP_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bEP?(\d{1,4})(?:\s*-\s*EP?(\d{1,4}))?\b").expect("Invalid EP pattern")
});

static DASH_EPISODE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s-\s(\d{1,3})(?:v\d)?(?:[\s\[(.]|$)").expect("Invalid dash episode pattern")
});

static BRACKET_EPISODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(\d{1,3})(?:v\d)?\]").expect("Invalid bracket episode pattern"));

static SEASON_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:\bS(\d{1,2})\b|Season\s*(\d{1,2})|第\s*(\d{1,2})\s*季)").expect("Invalid season pattern")
});

#[derive(Debug, Default, Clone, Copy)]
pub struct FilenameMetaParser;

impl FilenameMetaParser {
    pub fn new() -> Self {
        Self
    }

    fn episodes(stem: &str) -> (Option<u32>, Vec<u32>) {
        if let Some(c) = SXXEXX_PATTERN.captures(stem) {
            let begin = num(c.get(2));
            let end = num(c.get(3)).or_else(|| num(c.get(4)));
            return (begin, span(begin, end));
        }
        if let Some(c) = CN_EPISODE_PATTERN.captures(stem) {
            let begin = num(c.get(1));
            return (begin, span(begin, None));
        }
        if let Some(c) = EP_PATTERN.captures(stem) {
            let begin = num(c.get(1));
            return (begin, span(begin, num(c.get(2))));
        }
        if let Some(c) = DASH_EPISODE_PATTERN.captures(stem) {
            let begin = num(c.get(1));
            return (begin, span(begin, None));
        }
        if let Some(c) = BRACKET_EPISODE_PATTERN.captures(stem) {
            let begin = num(c.get(1));
            return (begin, span(begin, None));
        }
        (None, vec![])
    }

    fn seasons(text: &str) -> Vec<u32> {
        if let Some(c) = SXXEXX_PATTERN.captures(text) {
            return num(c.get(1)).into_iter().collect();
        }
        SEASON_PATTERN
            .captures(text)
            .and_then(|c| num(c.get(1).or_else(|| c.get(2)).or_else(|| c.get(3))))
            .into_iter()
            .collect()
    }
}

fn num(m: Option<regex::Match<'_>>) -> Option<u32> {
    m.and_then(|m| m.as_str().parse().ok())
}

fn span(begin: Option<u32>, end: Option<u32>) -> Vec<u32> {
    match (begin, end) {
        (Some(b), Some(e)) if e >= b && e - b <= MAX_EPISODE_SPAN => (b..=e).collect(),
        (Some(b), _) => vec![b],
        _ => vec![],
    }
}

impl MetadataExtractor for FilenameMetaParser {
    fn extract(&self, filename: &str) -> MediaMeta {
        let path = Path::new(filename);
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| filename.to_string());

        let (begin_episode, episodes) = Self::episodes(&stem);
        let mut seasons = Self::seasons(&stem);
        if seasons.is_empty() {
            seasons = Self::seasons(filename);
        }

        MediaMeta { begin_episode, episodes, seasons }
    }
}
